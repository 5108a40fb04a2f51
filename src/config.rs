use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{QualityCuts, TimeWindow};

// ---------------------------------------------------------------------------
// Parameter file
// ---------------------------------------------------------------------------

/// Top-level parameter file: which light curve, how to select, how to plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub data: DataConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Label key of the main source.
    #[serde(rename = "TAG")]
    pub tag: String,
    pub path: PathBuf,
    /// Further sources offered by the source selector: label → file.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
    pub flux_ratio: f64,
    pub index_ratio: f64,
    pub min_ts: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        let cuts = QualityCuts::default();
        Self {
            tmin: None,
            tmax: None,
            flux_ratio: cuts.flux_ratio,
            index_ratio: cuts.index_ratio,
            min_ts: cuts.min_ts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Figure size in inches.
    pub fig_width: f64,
    pub fig_height: f64,
    pub dpi: u32,
    /// Legend entry; the TAG when absent.
    pub label: Option<String>,
    /// Title prefix; the TAG when empty.
    pub plot_title: String,
    /// File name of the saved figure; `.svg` or `.png`.
    pub plot_name: String,
    /// Directory for the saved figure; the working directory when absent.
    pub save_dir: Option<PathBuf>,
    pub save_figure: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            fig_width: 20.0,
            fig_height: 8.0,
            dpi: 100,
            label: None,
            plot_title: String::new(),
            plot_name: "light_curve.png".into(),
            save_dir: None,
            save_figure: false,
        }
    }
}

impl Params {
    /// Parameters for plotting a single light-curve file with defaults.
    pub fn for_data_file(path: &Path) -> Self {
        let tag = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("light curve")
            .to_string();
        Params {
            data: DataConfig {
                tag,
                path: path.to_path_buf(),
                sources: BTreeMap::new(),
            },
            selection: SelectionConfig::default(),
            plot: PlotConfig::default(),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml_ng::from_str(text).context("parsing parameter file")
    }

    /// Parse YAML bytes; relative data paths are taken relative to `base_dir`.
    pub fn from_slice(bytes: &[u8], base_dir: &Path) -> Result<Self> {
        let mut params: Params = serde_yaml_ng::from_slice(bytes).context("parsing parameter file")?;
        params.resolve_paths(base_dir);
        Ok(params)
    }

    /// Read and parse a parameter file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading parameter file {}", path.display()))?;
        Self::from_slice(&bytes, path.parent().unwrap_or(Path::new("")))
            .with_context(|| format!("in {}", path.display()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).context("serializing parameters")
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        resolve(&mut self.data.path);
        self.data.sources.values_mut().for_each(resolve);
    }

    pub fn quality_cuts(&self) -> QualityCuts {
        QualityCuts {
            flux_ratio: self.selection.flux_ratio,
            index_ratio: self.selection.index_ratio,
            min_ts: self.selection.min_ts,
        }
    }

    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::new(self.selection.tmin, self.selection.tmax)
    }

    pub fn title(&self) -> &str {
        if self.plot.plot_title.is_empty() {
            &self.data.tag
        } else {
            &self.plot.plot_title
        }
    }

    pub fn label(&self) -> &str {
        self.plot.label.as_deref().unwrap_or(&self.data.tag)
    }

    /// Where the figure is saved.
    pub fn figure_path(&self) -> PathBuf {
        match &self.plot.save_dir {
            Some(dir) => dir.join(&self.plot.plot_name),
            None => PathBuf::from(&self.plot.plot_name),
        }
    }

    /// Every source offered for display: the main TAG first, then the catalog.
    pub fn all_sources(&self) -> Vec<(String, PathBuf)> {
        let mut out = vec![(self.data.tag.clone(), self.data.path.clone())];
        for (tag, path) in &self.data.sources {
            if *tag != self.data.tag {
                out.push((tag.clone(), path.clone()));
            }
        }
        out
    }

    /// Copy of these parameters pointed at another source.
    pub fn for_source(&self, tag: &str, path: &Path) -> Params {
        let mut params = self.clone();
        if tag != self.data.tag {
            params.data.tag = tag.to_string();
            params.data.path = path.to_path_buf();
            params.plot.plot_title = tag.to_string();
            params.plot.label = Some(tag.to_string());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
data:
  TAG: sourceA
  path: data/lc_sourceA.fits
  sources:
    "PKS 0903-57": /data/pks0903.fits
selection:
  tmin: 54700.0
  tmax: null
  flux_ratio: 3
  index_ratio: 2.5
  min_ts: 25
plot:
  fig_width: 12
  fig_height: 6
  dpi: 150
  label: Source A
  plot_title: "4C +01.02"
  plot_name: lc.svg
  save_dir: plots
  save_figure: true
"#;

    #[test]
    fn parses_full_parameter_file() {
        let params = Params::from_yaml(FULL).unwrap();
        assert_eq!(params.data.tag, "sourceA");
        assert_eq!(params.selection.tmin, Some(54700.0));
        assert_eq!(params.selection.tmax, None);
        assert_eq!(
            params.quality_cuts(),
            QualityCuts {
                flux_ratio: 3.0,
                index_ratio: 2.5,
                min_ts: 25.0
            }
        );
        assert_eq!(params.plot.dpi, 150);
        assert_eq!(params.title(), "4C +01.02");
        assert_eq!(params.label(), "Source A");
        assert_eq!(params.figure_path(), PathBuf::from("plots/lc.svg"));
        assert!(params.plot.save_figure);
    }

    #[test]
    fn selection_and_plot_default() {
        let params = Params::from_yaml("data:\n  TAG: src\n  path: lc.fits\n").unwrap();
        assert_eq!(params.quality_cuts(), QualityCuts::default());
        assert!(params.time_window().is_unbounded());
        assert_eq!(params.title(), "src");
        assert_eq!(params.label(), "src");
        assert!(!params.plot.save_figure);
        assert_eq!(params.figure_path(), PathBuf::from("light_curve.png"));
    }

    #[test]
    fn missing_data_section_is_an_error() {
        assert!(Params::from_yaml("selection:\n  min_ts: 4\n").is_err());
    }

    #[test]
    fn relative_paths_follow_the_parameter_file() {
        let params = Params::from_slice(FULL.as_bytes(), Path::new("/work/cfg")).unwrap();
        assert_eq!(params.data.path, PathBuf::from("/work/cfg/data/lc_sourceA.fits"));
        assert_eq!(params.data.sources["PKS 0903-57"], PathBuf::from("/data/pks0903.fits"));
    }

    #[test]
    fn source_list_starts_with_tag() {
        let params = Params::from_yaml(FULL).unwrap();
        let tags: Vec<String> = params.all_sources().into_iter().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["sourceA", "PKS 0903-57"]);

        let other = params.for_source("PKS 0903-57", Path::new("/data/pks0903.fits"));
        assert_eq!(other.title(), "PKS 0903-57");
        assert_eq!(other.quality_cuts(), params.quality_cuts());
    }

    #[test]
    fn data_file_defaults_use_file_stem() {
        let params = Params::for_data_file(Path::new("/data/lc_4C0102.fits"));
        assert_eq!(params.data.tag, "lc_4C0102");
        assert_eq!(params.quality_cuts(), QualityCuts::default());
        assert!(!params.plot.save_figure);
    }

    #[test]
    fn yaml_round_trip() {
        let params = Params::from_yaml(FULL).unwrap();
        let again = Params::from_yaml(&params.to_yaml().unwrap()).unwrap();
        assert_eq!(again, params);
    }
}
