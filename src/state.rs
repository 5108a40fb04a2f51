use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use gamma_lc::cache::ContentCache;
use gamma_lc::color::SourceColors;
use gamma_lc::config::{Params, SelectionConfig};
use gamma_lc::data::LightCurveDataset;
use gamma_lc::render::{self, Figure, RenderError};

// ---------------------------------------------------------------------------
// One displayed source
// ---------------------------------------------------------------------------

/// A loaded, filtered light curve together with its figure.
pub struct SourceView {
    pub params: Params,
    pub dataset: LightCurveDataset,
    /// `None` when nothing survives the selection.
    pub figure: Option<Figure>,
}

impl SourceView {
    /// Load and filter the configured light curve and lay out its figure,
    /// saving it when the parameters ask for it.
    pub fn build(params: Params) -> Result<Self> {
        let dataset = LightCurveDataset::load_with(&params.data.path, true, params.quality_cuts())
            .with_context(|| format!("loading {}", params.data.path.display()))?;

        let figure = match render::figure_from_dataset(&params, &dataset) {
            Ok(figure) => Some(figure),
            Err(RenderError::EmptySelection(tag)) => {
                log::warn!("No time bins of {tag} pass the selection");
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let (Some(fig), true) = (&figure, params.plot.save_figure) {
            render::save_figure(fig, &params.figure_path())?;
        }

        Ok(Self {
            params,
            dataset,
            figure,
        })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Parameter file currently shown (None for a bare light-curve file).
    pub params_path: Option<PathBuf>,

    /// Parameters as read from disk or derived from a light-curve file.
    pub params: Option<Params>,

    /// Selection being edited in the side panel.
    pub selection: SelectionConfig,

    /// Views of the main source keyed on parameter-file content.
    pub cache: ContentCache<SourceView>,

    /// Displayed sources: tag → view.
    pub views: BTreeMap<String, Arc<SourceView>>,

    /// Tags ticked in the source selector.
    pub selected: BTreeSet<String>,

    /// Colour per displayed source.
    pub colors: SourceColors,

    /// Whether the central panel shows the data table instead of the plot.
    pub show_table: bool,

    /// Source whose table is shown.
    pub table_tag: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            params_path: None,
            params: None,
            selection: SelectionConfig::default(),
            cache: ContentCache::new(),
            views: BTreeMap::new(),
            selected: BTreeSet::new(),
            colors: SourceColors::new::<&str>(&[]),
            show_table: false,
            table_tag: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Run `f`, logging and showing any error in the status line.
    pub fn report<T>(&mut self, what: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Option<T> {
        match f(self) {
            Ok(v) => Some(v),
            Err(e) => {
                log::error!("{what}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                None
            }
        }
    }

    /// Read a parameter file and show its main source.
    ///
    /// Unchanged file content reuses the view built the last time.
    pub fn load_params(&mut self, path: &Path) -> Result<()> {
        let base_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        let view = self.cache.get_or_build(path, |bytes| {
            let params = Params::from_slice(bytes, &base_dir)?;
            SourceView::build(params)
        })?;

        let tag = view.params.data.tag.clone();
        self.params_path = Some(path.to_path_buf());
        self.params = Some(view.params.clone());
        self.selection = view.params.selection.clone();
        self.views.clear();
        self.views.insert(tag.clone(), view);
        self.selected = BTreeSet::from([tag]);
        self.rebuild_colors();
        self.status_message = None;
        Ok(())
    }

    /// Re-read the current parameter file.
    pub fn reload(&mut self) -> Result<()> {
        match self.params_path.clone() {
            Some(path) => self.load_params(&path),
            None => self.apply_selection(),
        }
    }

    /// Show a single light-curve file with default parameters.
    pub fn load_data_file(&mut self, path: &Path) -> Result<()> {
        let params = Params::for_data_file(path);
        let view = SourceView::build(params.clone())?;

        let tag = params.data.tag.clone();
        self.params_path = None;
        self.selection = params.selection.clone();
        self.params = Some(params);
        self.views = BTreeMap::from([(tag.clone(), Arc::new(view))]);
        self.selected = BTreeSet::from([tag]);
        self.rebuild_colors();
        self.status_message = None;
        Ok(())
    }

    /// Rebuild every selected source with the edited selection.
    pub fn apply_selection(&mut self) -> Result<()> {
        let Some(params) = &mut self.params else {
            return Ok(());
        };
        params.selection = self.selection.clone();
        let params = params.clone();

        let mut views = BTreeMap::new();
        for (tag, path) in params.all_sources() {
            if self.selected.contains(&tag) {
                let view = SourceView::build(params.for_source(&tag, &path))?;
                views.insert(tag, Arc::new(view));
            }
        }
        self.views = views;
        self.rebuild_colors();
        self.status_message = None;
        Ok(())
    }

    /// Tick or untick a source in the selector.
    pub fn toggle_source(&mut self, tag: &str) -> Result<()> {
        if !self.selected.remove(tag) {
            self.selected.insert(tag.to_string());
        }
        let Some(params) = self.params.clone() else {
            return Ok(());
        };

        self.views.retain(|t, _| self.selected.contains(t));
        for (t, path) in params.all_sources() {
            if self.selected.contains(&t) && !self.views.contains_key(&t) {
                let view = SourceView::build(params.for_source(&t, &path))?;
                self.views.insert(t, Arc::new(view));
            }
        }
        self.rebuild_colors();
        Ok(())
    }

    fn rebuild_colors(&mut self) {
        let tags: Vec<&String> = self.views.keys().collect();
        self.colors = SourceColors::new(&tags);
    }

    /// Write the unfiltered table of every displayed source as CSV.
    pub fn export_csv(&mut self) -> Result<Vec<PathBuf>> {
        let written = self
            .views
            .values()
            .map(|v| v.dataset.export(None))
            .collect::<Result<Vec<_>, _>>()?;
        self.status_message = Some(format!("Exported {} file(s)", written.len()));
        Ok(written)
    }

    /// Save the figure of the first displayed source.
    pub fn save_figure(&mut self, path: &Path) -> Result<()> {
        let figure = self
            .views
            .values()
            .find_map(|v| v.figure.as_ref())
            .context("no figure to save")?;
        render::save_figure(figure, path)?;
        self.status_message = Some(format!("Plot saved to {}", path.display()));
        Ok(())
    }

    /// Rows loaded and rows passing the selection, over all displayed sources.
    pub fn counts(&self) -> (usize, usize) {
        self.views.values().fold((0, 0), |(all, kept), v| {
            (all + v.dataset.original().len(), kept + v.dataset.len())
        })
    }
}
