//! FITS light-curve tables read and written through `fitsio` (cfitsio).
//!
//! Reads the first extension as a binary table. Scalar columns go through
//! `read_col`. Per-row vector columns (`param_values`, `param_errors`) are read
//! with cfitsio's `ffgcvd`, which `fitsio` does not wrap for repeat > 1.

use std::io;
use std::path::Path;

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::tables::{ColumnDataType, ColumnDescription, ConcreteColumnDescription};
use fitsio::FitsFile;

/// HDU holding the light curve: the first extension.
const TABLE_HDU: usize = 1;

#[derive(Debug, thiserror::Error)]
pub enum FitsError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Cfitsio(String),

    #[error("HDU {0} is not a table")]
    NotATable(usize),

    #[error("header keyword {key} = {value} is not supported")]
    BadHeader { key: &'static str, value: i64 },

    #[error("table declares {declared} data bytes but the file holds {available}")]
    Truncated { declared: u64, available: u64 },

    #[error("no column named '{0}'")]
    NoSuchColumn(String),

    #[error("column '{column}' has {repeat} value(s) per row, expected {expected}")]
    ColumnShape {
        column: String,
        repeat: usize,
        expected: &'static str,
    },

    #[error("{0}")]
    Layout(String),
}

impl From<fitsio::errors::Error> for FitsError {
    fn from(e: fitsio::errors::Error) -> Self {
        FitsError::Cfitsio(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// An open FITS file positioned on its light-curve table.
pub struct BinTable {
    fits: FitsFile,
    hdu: FitsHdu,
    columns: Vec<ConcreteColumnDescription>,
    num_rows: usize,
}

impl BinTable {
    /// Open `path` and check that the table's declared extent fits in the
    /// file before anything is read.
    pub fn open(path: &Path) -> Result<Self, FitsError> {
        let available = std::fs::metadata(path)?.len();
        let mut fits = FitsFile::open(path)?;
        let hdu = fits.hdu(TABLE_HDU)?;

        let (columns, num_rows) = match &hdu.info {
            HduInfo::TableInfo {
                column_descriptions,
                num_rows,
            } => (column_descriptions.clone(), *num_rows),
            _ => return Err(FitsError::NotATable(TABLE_HDU)),
        };

        let bitpix: i64 = hdu.read_key(&mut fits, "BITPIX")?;
        if bitpix != 8 {
            return Err(FitsError::BadHeader { key: "BITPIX", value: bitpix });
        }
        let gcount: i64 = hdu.read_key(&mut fits, "GCOUNT")?;
        if gcount != 1 {
            return Err(FitsError::BadHeader { key: "GCOUNT", value: gcount });
        }
        let row_len: i64 = hdu.read_key(&mut fits, "NAXIS1")?;
        let row_len = u64::try_from(row_len).map_err(|_| FitsError::BadHeader {
            key: "NAXIS1",
            value: row_len,
        })?;

        let declared = row_len.checked_mul(num_rows as u64).unwrap_or(u64::MAX);
        if declared > available {
            return Err(FitsError::Truncated { declared, available });
        }

        Ok(Self {
            fits,
            hdu,
            columns,
            num_rows,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn columns(&self) -> &[ConcreteColumnDescription] {
        &self.columns
    }

    /// Case-insensitive lookup; returns the 1-based column number.
    fn find(&self, name: &str) -> Result<(usize, &ConcreteColumnDescription), FitsError> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name.eq_ignore_ascii_case(name))
            .map(|(i, c)| (i + 1, c))
            .ok_or_else(|| FitsError::NoSuchColumn(name.to_string()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// A one-value-per-row column as `f64`, TSCAL/TZERO applied.
    pub fn scalar_column(&mut self, name: &str) -> Result<Vec<f64>, FitsError> {
        let (_, column) = self.find(name)?;
        let repeat = column.data_type.repeat;
        if repeat != 1 {
            return Err(FitsError::ColumnShape {
                column: name.to_string(),
                repeat,
                expected: "1",
            });
        }
        let actual = column.name.clone();
        Ok(self.hdu.read_col::<f64>(&mut self.fits, actual.as_str())?)
    }

    /// A fixed-width vector column, one `Vec` per row.
    pub fn vector_column(&mut self, name: &str) -> Result<Vec<Vec<f64>>, FitsError> {
        let (colnum, column) = self.find(name)?;
        let repeat = column.data_type.repeat;
        if repeat == 0 {
            return Ok(vec![Vec::new(); self.num_rows]);
        }
        let total = repeat
            .checked_mul(self.num_rows)
            .ok_or_else(|| FitsError::Layout(format!("column '{name}' is too large")))?;
        if total == 0 {
            return Ok(Vec::new());
        }

        // Make the table HDU current again before the raw call.
        self.fits.hdu(TABLE_HDU)?;
        let mut flat = vec![0.0f64; total];
        let mut anynul = 0;
        let mut status = 0;
        // SAFETY: `flat` holds exactly `total` doubles and the file handle is
        // open on the table HDU.
        unsafe {
            fitsio::sys::ffgcvd(
                self.fits.as_raw(),
                colnum as i32,
                1,
                1,
                total as i64,
                0.0,
                flat.as_mut_ptr(),
                &mut anynul,
                &mut status,
            );
        }
        fitsio::errors::check_status(status)?;

        Ok(flat.chunks(repeat).map(<[f64]>::to_vec).collect())
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// A float64 column to write: one value per row, or a fixed-width vector.
#[derive(Debug, Clone)]
pub enum FitsColumn {
    Scalar(Vec<f64>),
    Vector(Vec<Vec<f64>>),
}

impl FitsColumn {
    fn rows(&self) -> usize {
        match self {
            FitsColumn::Scalar(v) => v.len(),
            FitsColumn::Vector(v) => v.len(),
        }
    }

    fn repeat(&self) -> usize {
        match self {
            FitsColumn::Scalar(_) => 1,
            FitsColumn::Vector(v) => v.first().map_or(0, Vec::len),
        }
    }

    fn flatten(&self) -> Vec<f64> {
        match self {
            FitsColumn::Scalar(v) => v.clone(),
            FitsColumn::Vector(v) => v.concat(),
        }
    }
}

/// Write a FITS file with an empty primary HDU and one BINTABLE extension
/// named `extname`, every column stored as `D` (float64). Replaces `path`.
pub fn write_bintable(path: &Path, extname: &str, columns: &[(&str, FitsColumn)]) -> Result<(), FitsError> {
    let rows = columns.first().map_or(0, |(_, c)| c.rows());
    for (name, column) in columns {
        let ragged = match column {
            FitsColumn::Vector(v) => v.iter().any(|r| r.len() != column.repeat()),
            FitsColumn::Scalar(_) => false,
        };
        if column.rows() != rows || ragged {
            return Err(FitsError::Layout(format!("column '{name}' does not match the table layout")));
        }
    }

    let descriptions = columns
        .iter()
        .map(|(name, column)| {
            ColumnDescription::new(*name)
                .with_type(ColumnDataType::Double)
                .that_repeats(column.repeat())
                .create()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut fits = FitsFile::create(path).overwrite().open()?;
    let hdu = fits.create_table(extname, &descriptions)?;
    for (name, column) in columns {
        let values = column.flatten();
        if !values.is_empty() {
            hdu.write_col(&mut fits, *name, &values)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<(&'static str, FitsColumn)> {
        vec![
            ("flux", FitsColumn::Scalar(vec![1.5, 2.5])),
            ("param_values", FitsColumn::Vector(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])),
        ]
    }

    #[test]
    fn written_table_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.fits");
        write_bintable(&path, "LIGHTCURVE", &columns()).unwrap();

        let mut table = BinTable::open(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.columns().len(), 2);
        assert!(table.has_column("FLUX"));
        assert_eq!(table.scalar_column("flux").unwrap(), vec![1.5, 2.5]);
        assert_eq!(
            table.vector_column("param_values").unwrap(),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn vector_column_is_not_a_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.fits");
        write_bintable(&path, "LIGHTCURVE", &columns()).unwrap();

        let mut table = BinTable::open(&path).unwrap();
        let err = table.scalar_column("param_values").unwrap_err();
        assert!(matches!(err, FitsError::ColumnShape { repeat: 3, .. }), "{err}");
        assert!(matches!(table.scalar_column("ts"), Err(FitsError::NoSuchColumn(_))));
    }

    #[test]
    fn ragged_columns_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let bad = [("p", FitsColumn::Vector(vec![vec![1.0, 2.0], vec![3.0]]))];
        let err = write_bintable(&dir.path().join("t.fits"), "X", &bad).unwrap_err();
        assert!(matches!(err, FitsError::Layout(_)));
    }

    // -- Hand-assembled headers for malformed files --

    fn header(cards: &[String]) -> Vec<u8> {
        let mut out = Vec::new();
        for card in cards.iter().map(String::as_str).chain(["END"]) {
            out.extend_from_slice(format!("{card:<80}").as_bytes());
        }
        out.resize(out.len().div_ceil(2880) * 2880, b' ');
        out
    }

    fn value(key: &str, v: &str) -> String {
        format!("{key:<8}= {v:>20}")
    }

    fn text(key: &str, v: &str) -> String {
        format!("{key:<8}= '{v:<8}'")
    }

    /// A two-column table `flux`, `ts` with the given overrides, no data unless given.
    fn raw_table(bitpix: i64, naxis1: i64, naxis2: &str, gcount: i64, ts_form: &str, data: &[u8]) -> Vec<u8> {
        let mut out = header(&[
            value("SIMPLE", "T"),
            value("BITPIX", "8"),
            value("NAXIS", "0"),
            value("EXTEND", "T"),
        ]);
        out.extend(header(&[
            text("XTENSION", "BINTABLE"),
            value("BITPIX", &bitpix.to_string()),
            value("NAXIS", "2"),
            value("NAXIS1", &naxis1.to_string()),
            value("NAXIS2", naxis2),
            value("PCOUNT", "0"),
            value("GCOUNT", &gcount.to_string()),
            value("TFIELDS", "2"),
            text("TTYPE1", "flux"),
            text("TFORM1", "1D"),
            text("TTYPE2", "ts"),
            text("TFORM2", ts_form),
        ]));
        let mut block = data.to_vec();
        if !block.is_empty() {
            block.resize(block.len().div_ceil(2880) * 2880, 0);
        }
        out.extend(block);
        out
    }

    fn with_raw<T>(bytes: &[u8], f: impl FnOnce(&Path) -> T) -> T {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.fits");
        std::fs::write(&path, bytes).unwrap();
        f(&path)
    }

    fn open_raw(bytes: &[u8]) -> Result<(), FitsError> {
        with_raw(bytes, |path| BinTable::open(path).map(|_| ()))
    }

    fn data(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn well_formed_raw_table_opens() {
        let bytes = raw_table(8, 16, "2", 1, "1D", &data(&[1.0, 25.0, 2.0, 4.0]));
        let ts = with_raw(&bytes, |path| BinTable::open(path)?.scalar_column("ts"));
        assert_eq!(ts.unwrap(), vec![25.0, 4.0]);
    }

    #[test]
    fn zero_gcount_is_an_error() {
        assert!(open_raw(&raw_table(8, 16, "2", 0, "1D", &[])).is_err());
    }

    #[test]
    fn non_byte_bitpix_is_an_error() {
        assert!(open_raw(&raw_table(0, 16, "2", 1, "1D", &[])).is_err());
    }

    #[test]
    fn missing_data_is_an_error() {
        let err = open_raw(&raw_table(8, 16, "4000", 1, "1D", &data(&[1.0, 2.0]))).unwrap_err();
        assert!(matches!(err, FitsError::Truncated { declared: 64000, .. } | FitsError::Cfitsio(_)), "{err}");
    }

    #[test]
    fn huge_row_count_is_an_error() {
        assert!(open_raw(&raw_table(8, 16, "9223372036854775807", 1, "1D", &[])).is_err());
    }

    #[test]
    fn zero_repeat_scalar_is_an_error() {
        let bytes = raw_table(8, 8, "2", 1, "0D", &data(&[1.0, 2.0]));
        let result = with_raw(&bytes, |path| BinTable::open(path)?.scalar_column("ts"));
        assert!(result.is_err());
    }
}
