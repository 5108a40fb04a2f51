use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Regular columns of a light-curve table, in export order.
/// `time_index` is the index key and is not part of this list.
pub const COLUMN_NAMES: [&str; 9] = [
    "flux",
    "flux_error",
    "eflux",
    "eflux_error",
    "bin_start",
    "bin_end",
    "significance",
    "spectral_index",
    "spectral_index_error",
];

/// Header name of the index column in exported tables.
pub const INDEX_NAME: &str = "time_index";

// ---------------------------------------------------------------------------
// LightBin – one row of the light curve
// ---------------------------------------------------------------------------

/// A single time bin of the light curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightBin {
    /// Midpoint of the bin in MJD; the table index.
    pub time_index: f64,
    /// Photon flux.
    pub flux: f64,
    pub flux_error: f64,
    /// Energy flux.
    pub eflux: f64,
    pub eflux_error: f64,
    /// Raw bin bounds (mission elapsed time).
    pub bin_start: f64,
    pub bin_end: f64,
    /// Test statistic (TS) of the detection in this bin.
    pub significance: f64,
    pub spectral_index: f64,
    pub spectral_index_error: f64,
}

impl LightBin {
    /// Values of the regular columns, in [`COLUMN_NAMES`] order.
    pub fn values(&self) -> [f64; 9] {
        [
            self.flux,
            self.flux_error,
            self.eflux,
            self.eflux_error,
            self.bin_start,
            self.bin_end,
            self.significance,
            self.spectral_index,
            self.spectral_index_error,
        ]
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Row / column count of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.columns)
    }
}

// ---------------------------------------------------------------------------
// LightCurveTable – rows indexed by time
// ---------------------------------------------------------------------------

/// Light-curve rows in input order, indexed by `time_index`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightCurveTable {
    bins: Vec<LightBin>,
}

impl LightCurveTable {
    pub fn from_bins(bins: Vec<LightBin>) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[LightBin] {
        &self.bins
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LightBin> {
        self.bins.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn shape(&self) -> Shape {
        Shape {
            rows: self.bins.len(),
            columns: COLUMN_NAMES.len(),
        }
    }

    /// The index column.
    pub fn time_index(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.time_index).collect()
    }

    /// Smallest and largest index value, `None` for an empty table.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let mut it = self.bins.iter().map(|b| b.time_index);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// New table keeping only rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&LightBin) -> bool,
    {
        Self {
            bins: self.bins.iter().filter(|b| keep(b)).copied().collect(),
        }
    }

    /// Copy of the table re-sorted by index.
    pub fn sorted_by_time(&self) -> Self {
        let mut bins = self.bins.clone();
        bins.sort_by(|a, b| a.time_index.total_cmp(&b.time_index));
        Self { bins }
    }
}

impl<'a> IntoIterator for &'a LightCurveTable {
    type Item = &'a LightBin;
    type IntoIter = std::slice::Iter<'a, LightBin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}
