use std::io;
use std::path::{Path, PathBuf};

use super::filter::QualityCuts;
use super::loader::{load_table, LoadError};
use super::model::{LightCurveTable, Shape, COLUMN_NAMES, INDEX_NAME};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// LightCurveDataset
// ---------------------------------------------------------------------------

/// A light curve loaded from one file.
///
/// Keeps the table exactly as loaded alongside a working view. Filtering
/// replaces the working view; the original is never handed out mutably.
#[derive(Debug, Clone)]
pub struct LightCurveDataset {
    source_path: PathBuf,
    original: LightCurveTable,
    original_shape: Shape,
    current: LightCurveTable,
    shape: Shape,
    is_filtered: bool,
}

impl LightCurveDataset {
    /// Load without filtering.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_with(path, false, QualityCuts::default())
    }

    /// Load, then filter with `cuts` when `auto_filter` is set.
    pub fn load_with(path: impl AsRef<Path>, auto_filter: bool, cuts: QualityCuts) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let original = load_table(path)?;
        log::info!("Loaded {} time bins from {}", original.len(), path.display());

        let mut dataset = Self::from_table(path, original);
        if auto_filter {
            dataset.filter(cuts);
        }
        Ok(dataset)
    }

    /// Wrap an already assembled table.
    pub fn from_table(path: impl Into<PathBuf>, original: LightCurveTable) -> Self {
        let shape = original.shape();
        Self {
            source_path: path.into(),
            current: original.clone(),
            original,
            original_shape: shape,
            shape,
            is_filtered: false,
        }
    }

    /// Replace the working view with its rows that pass `cuts`.
    ///
    /// Applies to the view as it currently stands, so repeated calls narrow
    /// the result further.
    pub fn filter(&mut self, cuts: QualityCuts) {
        let kept = cuts.apply(&self.current);
        log::debug!(
            "{}: {} of {} bins pass {:?}",
            self.source_path.display(),
            kept.len(),
            self.current.len(),
            cuts
        );
        self.current = kept;
        self.is_filtered = true;
        self.shape = self.current.shape();
    }

    /// Write the unfiltered table as CSV.
    ///
    /// Without a destination the source path with a `.csv` extension is used,
    /// or `<stem>_export.csv` when the source is itself that file.
    /// Returns the path written.
    pub fn export(&self, destination: Option<&Path>) -> Result<PathBuf, ExportError> {
        let path = destination
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_export_path());

        let file = std::fs::File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        write_csv(file, &self.original)?;

        log::info!("Data saved to {}", path.display());
        Ok(path)
    }

    fn default_export_path(&self) -> PathBuf {
        let path = self.source_path.with_extension("csv");
        if path != self.source_path {
            return path;
        }
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        path.with_file_name(format!("{stem}_export.csv"))
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The table as loaded.
    pub fn original(&self) -> &LightCurveTable {
        &self.original
    }

    /// The working view.
    pub fn current(&self) -> &LightCurveTable {
        &self.current
    }

    pub fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    /// Shape of the working view.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn original_shape(&self) -> Shape {
        self.original_shape
    }

    /// Rows in the working view.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

/// Write `table` with an index column followed by the regular columns.
pub fn write_csv<W: io::Write>(writer: W, table: &LightCurveTable) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec![INDEX_NAME];
    header.extend(COLUMN_NAMES);
    out.write_record(&header)?;

    for bin in table {
        let mut record = Vec::with_capacity(header.len());
        record.push(bin.time_index.to_string());
        record.extend(bin.values().iter().map(f64::to_string));
        out.write_record(&record)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}
