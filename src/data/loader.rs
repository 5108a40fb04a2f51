use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, FixedSizeListArray, Float64Array, LargeListArray, ListArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde_json::Value as JsonValue;

use super::fits::{BinTable, FitsError};
use super::model::{LightBin, LightCurveTable, COLUMN_NAMES, INDEX_NAME};

/// Scalar source columns every input must provide.
pub const SCALAR_COLUMNS: [&str; 9] = [
    "tmin", "tmax", "tmin_mjd", "tmax_mjd", "flux", "flux_err", "eflux", "eflux_err", "ts",
];

/// Per-row parameter arrays; element 1 is the spectral index.
pub const PARAMETER_COLUMNS: [&str; 2] = ["param_values", "param_errors"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed FITS file: {0}")]
    Fits(#[from] FitsError),

    #[error("malformed parquet file: {0}")]
    Parquet(#[from] ParquetError),

    #[error("reading arrow data: {0}")]
    Arrow(#[from] ArrowError),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: '{column}' has {len} element(s), at least 2 are required")]
    ShortParameterArray { column: String, row: usize, len: usize },

    #[error("row {row}, column '{column}': {detail}")]
    InvalidValue {
        row: usize,
        column: String,
        detail: String,
    },
}

impl LoadError {
    fn invalid(row: usize, column: &str, detail: impl Into<String>) -> Self {
        LoadError::InvalidValue {
            row,
            column: column.to_string(),
            detail: detail.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a light-curve table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.fits` / `.fit` / `.fts` – first BINTABLE extension (FermiPy output)
/// * `.parquet` / `.pq`        – same columns, parameter arrays as list columns
/// * `.json`                   – `[{ "tmin": ..., "param_values": [...], ... }, ...]`
/// * `.csv`                    – exported tables (`time_index` header) or source
///   columns with semicolon-separated parameter arrays
pub fn load_table(path: &Path) -> Result<LightCurveTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "fits" | "fit" | "fts" => load_fits(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Source columns → table
// ---------------------------------------------------------------------------

/// Raw columns as named in the FermiPy light-curve output.
#[derive(Debug, Default)]
struct SourceColumns {
    /// Indexed like [`SCALAR_COLUMNS`].
    scalars: [Vec<f64>; 9],
    param_values: Vec<Vec<f64>>,
    param_errors: Vec<Vec<f64>>,
}

impl SourceColumns {
    fn push_scalars(&mut self, row: [f64; 9]) {
        for (col, v) in self.scalars.iter_mut().zip(row) {
            col.push(v);
        }
    }

    /// Derive the index and spectral index, producing the table.
    fn into_table(self) -> Result<LightCurveTable, LoadError> {
        let rows = self.param_values.len();
        for (name, col) in SCALAR_COLUMNS.iter().zip(&self.scalars) {
            if col.len() != rows {
                return Err(LoadError::invalid(
                    col.len().min(rows),
                    name,
                    format!("{} values for {rows} rows", col.len()),
                ));
            }
        }
        if self.param_errors.len() != rows {
            return Err(LoadError::invalid(
                self.param_errors.len().min(rows),
                "param_errors",
                format!("{} values for {rows} rows", self.param_errors.len()),
            ));
        }

        let [tmin, tmax, tmin_mjd, tmax_mjd, flux, flux_err, eflux, eflux_err, ts] = &self.scalars;
        let mut bins = Vec::with_capacity(rows);
        for row in 0..rows {
            let index = second_element(&self.param_values[row], PARAMETER_COLUMNS[0], row)?;
            let index_error = second_element(&self.param_errors[row], PARAMETER_COLUMNS[1], row)?;
            bins.push(LightBin {
                time_index: (tmin_mjd[row] + tmax_mjd[row]) / 2.0,
                flux: flux[row],
                flux_error: flux_err[row],
                eflux: eflux[row],
                eflux_error: eflux_err[row],
                bin_start: tmin[row],
                bin_end: tmax[row],
                significance: ts[row],
                spectral_index: index,
                spectral_index_error: index_error,
            });
        }
        Ok(LightCurveTable::from_bins(bins))
    }
}

fn second_element(params: &[f64], column: &str, row: usize) -> Result<f64, LoadError> {
    params
        .get(1)
        .copied()
        .ok_or_else(|| LoadError::ShortParameterArray {
            column: column.to_string(),
            row,
            len: params.len(),
        })
}

// ---------------------------------------------------------------------------
// FITS loader
// ---------------------------------------------------------------------------

fn load_fits(path: &Path) -> Result<LightCurveTable, LoadError> {
    let mut table = BinTable::open(path).map_err(|e| match e {
        FitsError::Io(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => LoadError::Fits(other),
    })?;

    for name in SCALAR_COLUMNS.iter().chain(&PARAMETER_COLUMNS) {
        if !table.has_column(name) {
            return Err(LoadError::MissingColumn(name.to_string()));
        }
    }

    let mut columns = SourceColumns::default();
    for (slot, name) in columns.scalars.iter_mut().zip(SCALAR_COLUMNS) {
        *slot = table.scalar_column(name)?;
    }
    columns.param_values = table.vector_column(PARAMETER_COLUMNS[0])?;
    columns.param_errors = table.vector_column(PARAMETER_COLUMNS[1])?;

    log::debug!("{}: {} FITS rows", path.display(), table.num_rows());
    columns.into_table()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as written by
/// `Table.to_pandas().to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "tmin": 239557417.0, "tmax": 240162217.0,
///     "tmin_mjd": 54682.65, "tmax_mjd": 54689.65,
///     "flux": 2.1e-7, "flux_err": 3.0e-8,
///     "eflux": 1.2e-4, "eflux_err": 2.0e-5,
///     "ts": 85.3,
///     "param_values": [2.1e-12, 2.35, 0.0],
///     "param_errors": [3.0e-13, 0.11, 0.0]
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<LightCurveTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(io_error(path))?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::invalid(0, "<root>", "expected top-level JSON array"))?;
    // Records carry the schema; with none the columns cannot be checked.
    if records.is_empty() {
        return Err(LoadError::MissingColumn(SCALAR_COLUMNS[0].to_string()));
    }

    let mut columns = SourceColumns::default();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::invalid(i, "<row>", "not a JSON object"))?;

        let mut row = [0.0; 9];
        for (slot, name) in row.iter_mut().zip(SCALAR_COLUMNS) {
            let val = obj
                .get(name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))?;
            *slot = val
                .as_f64()
                .ok_or_else(|| LoadError::invalid(i, name, "not a number"))?;
        }
        columns.push_scalars(row);
        columns
            .param_values
            .push(json_array_to_f64(obj.get(PARAMETER_COLUMNS[0]), i, PARAMETER_COLUMNS[0])?);
        columns
            .param_errors
            .push(json_array_to_f64(obj.get(PARAMETER_COLUMNS[1]), i, PARAMETER_COLUMNS[1])?);
    }

    columns.into_table()
}

fn json_array_to_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Vec<f64>, LoadError> {
    let arr = val
        .ok_or_else(|| LoadError::MissingColumn(col.to_string()))?
        .as_array()
        .ok_or_else(|| LoadError::invalid(row, col, "not an array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .ok_or_else(|| LoadError::invalid(row, col, format!("element {j} is not a number")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Two CSV layouts are accepted, told apart by the header:
/// * exported tables: `time_index` followed by the regular columns
/// * source columns, with `param_values` / `param_errors` holding
///   semicolon-separated floats: `"2.1e-12;2.35;0.0"`
fn load_csv(path: &Path) -> Result<LightCurveTable, LoadError> {
    let file = std::fs::File::open(path).map_err(io_error(path))?;
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };

    if headers.iter().any(|h| h == INDEX_NAME) {
        let index_idx = position(INDEX_NAME)?;
        let value_idx = COLUMN_NAMES
            .into_iter()
            .map(position)
            .collect::<Result<Vec<_>, _>>()?;

        let mut bins = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result?;
            let field = |idx: usize, name: &str| parse_float(record.get(idx).unwrap_or(""), row_no, name);
            let mut v = [0.0; 9];
            for ((slot, &idx), name) in v.iter_mut().zip(&value_idx).zip(COLUMN_NAMES) {
                *slot = field(idx, name)?;
            }
            bins.push(LightBin {
                time_index: field(index_idx, INDEX_NAME)?,
                flux: v[0],
                flux_error: v[1],
                eflux: v[2],
                eflux_error: v[3],
                bin_start: v[4],
                bin_end: v[5],
                significance: v[6],
                spectral_index: v[7],
                spectral_index_error: v[8],
            });
        }
        return Ok(LightCurveTable::from_bins(bins));
    }

    let scalar_idx = SCALAR_COLUMNS
        .into_iter()
        .map(position)
        .collect::<Result<Vec<_>, _>>()?;
    let values_idx = position(PARAMETER_COLUMNS[0])?;
    let errors_idx = position(PARAMETER_COLUMNS[1])?;

    let mut columns = SourceColumns::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let mut row = [0.0; 9];
        for ((slot, &idx), name) in row.iter_mut().zip(&scalar_idx).zip(SCALAR_COLUMNS) {
            *slot = parse_float(record.get(idx).unwrap_or(""), row_no, name)?;
        }
        columns.push_scalars(row);
        columns.param_values.push(parse_semicolon_floats(
            record.get(values_idx).unwrap_or(""),
            row_no,
            PARAMETER_COLUMNS[0],
        )?);
        columns.param_errors.push(parse_semicolon_floats(
            record.get(errors_idx).unwrap_or(""),
            row_no,
            PARAMETER_COLUMNS[1],
        )?);
    }

    columns.into_table()
}

fn parse_float(s: &str, row: usize, col: &str) -> Result<f64, LoadError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| LoadError::invalid(row, col, format!("'{s}' is not a number")))
}

fn parse_semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>, LoadError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<f64>()
                .map_err(|_| LoadError::invalid(row, col, format!("element {j}: '{tok}' is not a number")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding a light curve.
///
/// Expected schema:
/// - the scalar source columns as Float64 / Float32 / Int32 / Int64
/// - `param_values`, `param_errors`: List, LargeList or FixedSizeList of
///   Float64 / Float32
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<LightCurveTable, LoadError> {
    let file = std::fs::File::open(path).map_err(io_error(path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // Required columns come from the schema, so a file without row groups
    // is still checked.
    let schema = builder.schema();
    for name in SCALAR_COLUMNS.iter().chain(&PARAMETER_COLUMNS) {
        if !schema.fields().iter().any(|f| f.name().eq_ignore_ascii_case(name)) {
            return Err(LoadError::MissingColumn(name.to_string()));
        }
    }
    let reader = builder.build()?;

    let mut columns = SourceColumns::default();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let n_rows = batch.num_rows();
        let offset = columns.param_values.len();

        let index_of = |name: &str| {
            schema
                .fields()
                .iter()
                .position(|f| f.name().eq_ignore_ascii_case(name))
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        let mut scalars = Vec::with_capacity(SCALAR_COLUMNS.len());
        for name in SCALAR_COLUMNS {
            let as_f64 = cast(batch.column(index_of(name)?), &DataType::Float64)?;
            let values = as_f64
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| LoadError::invalid(offset, name, "not a numeric column"))?
                .iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect::<Vec<f64>>();
            scalars.push(values);
        }
        for (slot, values) in columns.scalars.iter_mut().zip(scalars) {
            slot.extend(values);
        }

        let values_col = batch.column(index_of(PARAMETER_COLUMNS[0])?);
        let errors_col = batch.column(index_of(PARAMETER_COLUMNS[1])?);
        for row in 0..n_rows {
            columns.param_values.push(
                extract_f64_list(values_col, row)
                    .map_err(|e| LoadError::invalid(offset + row, PARAMETER_COLUMNS[0], e))?,
            );
            columns.param_errors.push(
                extract_f64_list(errors_col, row)
                    .map_err(|e| LoadError::invalid(offset + row, PARAMETER_COLUMNS[1], e))?,
            );
        }
    }

    columns.into_table()
}

// -- Parquet / Arrow helpers --

/// Extract a `Vec<f64>` from a list column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>, String> {
    if col.is_null(row) {
        return Err("null value in list column".into());
    }

    let values_array = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or("expected ListArray")?
            .value(row),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .ok_or("expected LargeListArray")?
            .value(row),
        DataType::FixedSizeList(_, _) => col
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or("expected FixedSizeListArray")?
            .value(row),
        other => return Err(format!("expected a list column, got {other:?}")),
    };

    // The inner array can be any numeric type; Float32 widens losslessly.
    let values = cast(&values_array, &DataType::Float64).map_err(|e| e.to_string())?;
    let f64_arr = values
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| format!("list inner type is {:?}", values_array.data_type()))?;
    Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use arrow::array::{Float64Builder, ListBuilder};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::fits::{write_bintable, FitsColumn};

    /// Source rows for fixtures: (tmin_mjd, tmax_mjd, flux, flux_err, ts, index, index_err).
    pub(crate) const ROWS: [(f64, f64, f64, f64, f64, f64, f64); 3] = [
        (54682.0, 54689.0, 2.0e-7, 5.0e-8, 30.0, 2.3, 0.2),
        (54689.0, 54696.0, 1.0e-7, 6.0e-8, 4.0, 2.1, 0.9),
        (54696.0, 54703.0, 3.0e-7, 4.0e-8, 80.0, 2.5, 0.1),
    ];

    fn mjd_to_met(mjd: f64) -> f64 {
        (mjd - 51910.0) * 86400.0
    }

    pub(crate) fn fits_columns(param_len: usize) -> Vec<(&'static str, FitsColumn)> {
        let col = |f: fn(&(f64, f64, f64, f64, f64, f64, f64)) -> f64| {
            FitsColumn::Scalar(ROWS.iter().map(f).collect())
        };
        let params = |f: fn(&(f64, f64, f64, f64, f64, f64, f64)) -> f64| {
            FitsColumn::Vector(
                ROWS.iter()
                    .map(|r| {
                        let mut v = vec![0.0; param_len];
                        if param_len > 1 {
                            v[1] = f(r);
                        }
                        v
                    })
                    .collect(),
            )
        };
        vec![
            ("tmin", col(|r| mjd_to_met(r.0))),
            ("tmax", col(|r| mjd_to_met(r.1))),
            ("tmin_mjd", col(|r| r.0)),
            ("tmax_mjd", col(|r| r.1)),
            ("flux", col(|r| r.2)),
            ("flux_err", col(|r| r.3)),
            ("eflux", col(|r| r.2 * 500.0)),
            ("eflux_err", col(|r| r.3 * 500.0)),
            ("ts", col(|r| r.4)),
            ("param_values", params(|r| r.5)),
            ("param_errors", params(|r| r.6)),
        ]
    }

    pub(crate) fn write_fits_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("lc.fits");
        write_bintable(&path, "LIGHTCURVE", &fits_columns(3)).unwrap();
        path
    }

    fn assert_fixture_table(table: &LightCurveTable) {
        assert_eq!(table.len(), ROWS.len());
        for (bin, row) in table.iter().zip(ROWS) {
            assert_eq!(bin.time_index, (row.0 + row.1) / 2.0);
            assert_eq!(bin.flux, row.2);
            assert_eq!(bin.flux_error, row.3);
            assert_eq!(bin.significance, row.4);
            assert_eq!(bin.spectral_index, row.5);
            assert_eq!(bin.spectral_index_error, row.6);
            assert_eq!(bin.bin_start, mjd_to_met(row.0));
        }
    }

    #[test]
    fn loads_fits_light_curve() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_table(&write_fits_fixture(dir.path())).unwrap();
        assert_fixture_table(&table);
    }

    #[test]
    fn fits_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.fits");
        let columns: Vec<_> = fits_columns(3).into_iter().filter(|(n, _)| *n != "ts").collect();
        write_bintable(&path, "LIGHTCURVE", &columns).unwrap();

        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "ts"), "{err}");
    }

    #[test]
    fn short_parameter_arrays_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.fits");
        write_bintable(&path, "LIGHTCURVE", &fits_columns(1)).unwrap();

        let err = load_table(&path).unwrap_err();
        assert!(
            matches!(err, LoadError::ShortParameterArray { ref column, row: 0, len: 1 } if column == "param_values"),
            "{err}"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_table(Path::new("/nonexistent/lc.fits")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_table(Path::new("lc.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref e) if e == "txt"));
    }

    #[test]
    fn garbage_fits_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.fits");
        std::fs::write(&path, b"not a fits file").unwrap();
        assert!(matches!(load_table(&path).unwrap_err(), LoadError::Fits(_)));
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.json");
        let records: Vec<JsonValue> = ROWS
            .iter()
            .map(|r| {
                serde_json::json!({
                    "tmin": mjd_to_met(r.0), "tmax": mjd_to_met(r.1),
                    "tmin_mjd": r.0, "tmax_mjd": r.1,
                    "flux": r.2, "flux_err": r.3,
                    "eflux": r.2 * 500.0, "eflux_err": r.3 * 500.0,
                    "ts": r.4,
                    "param_values": [1e-12, r.5, 0.0],
                    "param_errors": [1e-13, r.6, 0.0],
                })
            })
            .collect();
        std::fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        assert_fixture_table(&load_table(&path).unwrap());
    }

    #[test]
    fn loads_source_layout_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "tmin,tmax,tmin_mjd,tmax_mjd,flux,flux_err,eflux,eflux_err,ts,param_values,param_errors").unwrap();
        for r in ROWS {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},1e-12;{};0,1e-13;{};0",
                mjd_to_met(r.0),
                mjd_to_met(r.1),
                r.0,
                r.1,
                r.2,
                r.3,
                r.2 * 500.0,
                r.3 * 500.0,
                r.4,
                r.5,
                r.6
            )
            .unwrap();
        }
        drop(file);

        assert_fixture_table(&load_table(&path).unwrap());
    }

    #[test]
    fn csv_with_bad_number_points_at_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.csv");
        std::fs::write(
            &path,
            "time_index,flux,flux_error,eflux,eflux_error,bin_start,bin_end,significance,spectral_index,spectral_index_error\n\
             1.0,abc,1,1,1,1,1,1,1,1\n",
        )
        .unwrap();
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { row: 0, ref column, .. } if column == "flux"), "{err}");
    }

    #[test]
    fn loads_parquet_with_list_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.parquet");

        let scalar = |f: fn(&(f64, f64, f64, f64, f64, f64, f64)) -> f64| -> Arc<dyn Array> {
            Arc::new(Float64Array::from(ROWS.iter().map(f).collect::<Vec<_>>()))
        };
        let list = |f: fn(&(f64, f64, f64, f64, f64, f64, f64)) -> f64| -> Arc<dyn Array> {
            let mut builder = ListBuilder::new(Float64Builder::new());
            for r in &ROWS {
                builder.values().append_slice(&[0.0, f(r)]);
                builder.append(true);
            }
            Arc::new(builder.finish())
        };
        let list_type = DataType::List(Arc::new(Field::new("item", DataType::Float64, true)));

        let mut fields = Vec::new();
        for name in SCALAR_COLUMNS {
            fields.push(Field::new(name, DataType::Float64, false));
        }
        fields.push(Field::new("param_values", list_type.clone(), false));
        fields.push(Field::new("param_errors", list_type, false));
        let schema = Arc::new(Schema::new(fields));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                scalar(|r| mjd_to_met(r.0)),
                scalar(|r| mjd_to_met(r.1)),
                scalar(|r| r.0),
                scalar(|r| r.1),
                scalar(|r| r.2),
                scalar(|r| r.3),
                scalar(|r| r.2 * 500.0),
                scalar(|r| r.3 * 500.0),
                scalar(|r| r.4),
                list(|r| r.5),
                list(|r| r.6),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert_fixture_table(&load_table(&path).unwrap());
    }

    #[test]
    fn parquet_without_rows_still_needs_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.parquet");
        let fields: Vec<Field> = SCALAR_COLUMNS
            .iter()
            .filter(|n| **n != "ts")
            .map(|n| Field::new(*n, DataType::Float64, false))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let writer = ArrowWriter::try_new(std::fs::File::create(&path).unwrap(), schema, None).unwrap();
        writer.close().unwrap();

        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "ts"), "{err}");
    }

    #[test]
    fn empty_json_array_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(load_table(&path).unwrap_err(), LoadError::MissingColumn(_)));
    }
}
