//! Light-curve figures: built from parameters and a dataset, rendered to
//! SVG, optionally rasterised to PNG, and saved.

pub mod axes;
#[cfg(feature = "png")]
pub mod png;
pub mod svg;

use std::path::{Path, PathBuf};

use crate::config::Params;
use crate::data::{LightCurveDataset, LightCurveTable, LoadError};

pub use svg::render_svg;

/// Flux values are plotted in units of 10⁻⁶ ph cm⁻² s⁻¹.
pub const FLUX_SCALE: f64 = 1e6;

pub const X_LABEL: &str = "MJD";
pub const Y_LABEL: &str = "Photon Flux (10\u{207B}\u{2076} ph cm\u{207B}\u{00B2} s\u{207B}\u{00B9})";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("no time bins of '{0}' survive the selection")]
    EmptySelection(String),

    #[error("unsupported figure format: .{0}")]
    UnsupportedOutput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const GREEN: Rgb = Rgb(0, 128, 0);

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// One error-bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yerr: Vec<f64>,
    pub line_color: Rgb,
    pub error_color: Rgb,
    pub line_width: f64,
}

/// Everything needed to draw a light-curve chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub series: Vec<Series>,
}

/// Load the configured light curve, apply the quality cuts and time window,
/// and lay out the figure.
pub fn build_figure(params: &Params) -> Result<Figure> {
    let mut dataset = LightCurveDataset::load(&params.data.path)?;
    dataset.filter(params.quality_cuts());
    figure_from_dataset(params, &dataset)
}

/// Lay out the figure for an already filtered dataset.
pub fn figure_from_dataset(params: &Params, dataset: &LightCurveDataset) -> Result<Figure> {
    let selected = params.time_window().select(dataset.current());
    figure_from_table(params, &selected)
}

fn figure_from_table(params: &Params, table: &LightCurveTable) -> Result<Figure> {
    let (first, last) = table
        .time_span()
        .ok_or_else(|| RenderError::EmptySelection(params.data.tag.clone()))?;

    let series = Series {
        label: params.label().to_string(),
        x: table.time_index(),
        y: table.iter().map(|b| b.flux * FLUX_SCALE).collect(),
        yerr: table.iter().map(|b| b.flux_error * FLUX_SCALE).collect(),
        line_color: Rgb::BLUE,
        error_color: Rgb::GREEN,
        line_width: 2.0,
    };

    Ok(Figure {
        title: format!(
            "{} (TS > {}) (MJD: {first:.2}-{last:.2})",
            params.title(),
            params.selection.min_ts
        ),
        x_label: X_LABEL.to_string(),
        y_label: Y_LABEL.to_string(),
        width_in: params.plot.fig_width,
        height_in: params.plot.fig_height,
        dpi: params.plot.dpi,
        series: vec![series],
    })
}

/// Rasterise `figure` at its own dpi.
#[cfg(feature = "png")]
pub fn render_png(figure: &Figure) -> Result<Vec<u8>> {
    png::svg_to_png(&render_svg(figure), figure.dpi)
}

/// Write `figure` to `path`, choosing the format from the extension.
pub fn save_figure(figure: &Figure, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "svg" => std::fs::write(path, render_svg(figure))?,
        #[cfg(feature = "png")]
        "png" => std::fs::write(path, render_png(figure)?)?,
        other => return Err(RenderError::UnsupportedOutput(other.to_string())),
    }
    log::info!("Plot saved to {}", path.display());
    Ok(())
}

/// Build the figure and save it when the parameters ask for it.
/// Returns the figure and where it was saved.
pub fn generate_figure(params: &Params) -> Result<(Figure, Option<PathBuf>)> {
    let figure = build_figure(params)?;
    if !params.plot.save_figure {
        return Ok((figure, None));
    }
    let path = params.figure_path();
    save_figure(&figure, &path)?;
    Ok((figure, Some(path)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::loader::tests::write_fits_fixture;

    pub(crate) fn sample_figure() -> Figure {
        Figure {
            title: "Source A (TS > 9) (MJD: 100.00-102.00)".into(),
            x_label: X_LABEL.into(),
            y_label: Y_LABEL.into(),
            width_in: 10.0,
            height_in: 4.0,
            dpi: 72,
            series: vec![Series {
                label: "Source A".into(),
                x: vec![100.0, 101.0, 102.0],
                y: vec![0.2, 0.35, 0.3],
                yerr: vec![0.05, 0.04, 0.06],
                line_color: Rgb::BLUE,
                error_color: Rgb::GREEN,
                line_width: 2.0,
            }],
        }
    }

    fn params_for(path: &Path) -> Params {
        let mut params = Params::from_yaml("data:\n  TAG: srcA\n  path: lc.fits\nplot:\n  plot_title: Source A\n").unwrap();
        params.data.path = path.to_path_buf();
        params
    }

    #[test]
    fn figure_scales_flux_and_formats_title() {
        let dir = tempfile::tempdir().unwrap();
        let params = params_for(&write_fits_fixture(dir.path()));
        let fig = build_figure(&params).unwrap();

        // Fixture rows 0 and 2 survive the default cuts.
        let s = &fig.series[0];
        assert_eq!(s.x, vec![54685.5, 54699.5]);
        assert!((s.y[0] - 0.2).abs() < 1e-12);
        assert!((s.yerr[1] - 0.04).abs() < 1e-12);
        assert_eq!(s.label, "srcA");
        assert_eq!(fig.title, "Source A (TS > 9) (MJD: 54685.50-54699.50)");
        assert_eq!(fig.x_label, "MJD");
    }

    #[test]
    fn time_window_narrows_the_figure() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_for(&write_fits_fixture(dir.path()));
        params.selection.tmax = Some(54690.0);
        let fig = build_figure(&params).unwrap();
        assert_eq!(fig.series[0].x, vec![54685.5]);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_for(&write_fits_fixture(dir.path()));
        params.selection.min_ts = 1000.0;
        assert!(matches!(build_figure(&params), Err(RenderError::EmptySelection(tag)) if tag == "srcA"));
    }

    #[test]
    fn generate_saves_only_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_for(&write_fits_fixture(dir.path()));
        params.plot.plot_name = "lc.svg".into();
        params.plot.save_dir = Some(dir.path().join("plots"));

        let (_, saved) = generate_figure(&params).unwrap();
        assert_eq!(saved, None);

        params.plot.save_figure = true;
        let (_, saved) = generate_figure(&params).unwrap();
        let saved = saved.unwrap();
        assert_eq!(saved, dir.path().join("plots/lc.svg"));
        assert!(std::fs::read_to_string(saved).unwrap().contains("Source A (TS &gt; 9)"));
    }

    #[test]
    fn unknown_output_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_figure(&sample_figure(), &dir.path().join("lc.bmp")).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedOutput(ext) if ext == "bmp"));
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_extension_rasterises() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.PNG");
        save_figure(&sample_figure(), &path).unwrap();
        assert!(std::fs::read(path).unwrap().starts_with(b"\x89PNG"));
    }

    #[test]
    fn colours_render_as_hex() {
        assert_eq!(Rgb::GREEN.to_hex(), "#008000");
    }
}
