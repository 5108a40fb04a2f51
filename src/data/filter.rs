use serde::{Deserialize, Serialize};

use super::model::{LightBin, LightCurveTable};

// ---------------------------------------------------------------------------
// Quality cuts
// ---------------------------------------------------------------------------

/// Thresholds a time bin must exceed to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityCuts {
    /// Minimum `flux / flux_error`.
    pub flux_ratio: f64,
    /// Minimum `|spectral_index / spectral_index_error|`.
    pub index_ratio: f64,
    /// Minimum test statistic.
    pub min_ts: f64,
}

impl Default for QualityCuts {
    fn default() -> Self {
        Self {
            flux_ratio: 2.0,
            index_ratio: 2.0,
            min_ts: 9.0,
        }
    }
}

impl QualityCuts {
    /// Whether a bin passes all three cuts.
    ///
    /// Plain IEEE arithmetic: a zero error with non-zero numerator gives an
    /// infinite ratio (passes), `0 / 0` gives NaN (fails every comparison).
    pub fn accepts(&self, bin: &LightBin) -> bool {
        bin.flux / bin.flux_error > self.flux_ratio
            && (bin.spectral_index / bin.spectral_index_error).abs() > self.index_ratio
            && bin.significance > self.min_ts
    }

    /// New table with the rows of `table` that pass.
    pub fn apply(&self, table: &LightCurveTable) -> LightCurveTable {
        table.retain_rows(|bin| self.accepts(bin))
    }
}

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range over `time_index`; `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeWindow {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TimeWindow {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start.map_or(true, |s| t >= s) && self.end.map_or(true, |e| t <= e)
    }

    /// Rows of `table` whose index lies in the window.
    pub fn select(&self, table: &LightCurveTable) -> LightCurveTable {
        if self.is_unbounded() {
            return table.clone();
        }
        table.retain_rows(|bin| self.contains(bin.time_index))
    }
}
