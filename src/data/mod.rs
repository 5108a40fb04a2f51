/// Data layer: light-curve types, loading, selection and export.
///
/// Architecture:
/// ```text
///  .fits / .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → LightCurveTable (fits: BINTABLE reader)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ LightCurveDataset  │  original table + current view, export
///   └───────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  quality cuts → new current view; time-window selection
///   └──────────┘
/// ```

pub mod dataset;
pub mod filter;
pub mod fits;
pub mod loader;
pub mod model;

pub use dataset::{ExportError, LightCurveDataset};
pub use filter::{QualityCuts, TimeWindow};
pub use loader::{load_table, LoadError};
pub use model::{LightBin, LightCurveTable, Shape};
