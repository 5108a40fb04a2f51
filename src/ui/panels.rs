use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use gamma_lc::render::Rgb;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    let Some(params) = state.params.clone() else {
        ui.label("No light curve loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Quality cuts ----
            ui.strong("Quality cuts");
            egui::Grid::new("quality_cuts").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("flux / σ >");
                ui.add(DragValue::new(&mut state.selection.flux_ratio).speed(0.1).range(0.0..=f64::MAX));
                ui.end_row();

                ui.label("index / σ >");
                ui.add(DragValue::new(&mut state.selection.index_ratio).speed(0.1).range(0.0..=f64::MAX));
                ui.end_row();

                ui.label("TS >");
                ui.add(DragValue::new(&mut state.selection.min_ts).speed(0.5).range(0.0..=f64::MAX));
                ui.end_row();
            });
            ui.separator();

            // ---- Time window ----
            ui.strong("Time window (MJD)");
            let span = state
                .views
                .values()
                .filter_map(|v| v.dataset.original().time_span())
                .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)));
            bound_editor(ui, "from", &mut state.selection.tmin, span.map(|s| s.0));
            bound_editor(ui, "to", &mut state.selection.tmax, span.map(|s| s.1));
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Apply").clicked() {
                    state.report("apply selection", |s| s.apply_selection());
                }
                if ui.button("Reset").clicked() {
                    state.selection = params.selection.clone();
                }
            });
            ui.separator();

            // ---- Sources ----
            ui.strong("Sources");
            for (tag, _) in params.all_sources() {
                let mut checked = state.selected.contains(&tag);
                let text = RichText::new(&tag).color(state.colors.color_for(&tag));
                if ui.checkbox(&mut checked, text).changed() {
                    state.report("select source", |s| s.toggle_source(&tag));
                }
            }
            ui.separator();

            // ---- Shapes ----
            ui.strong("Shapes");
            for (tag, view) in &state.views {
                ui.label(format!(
                    "{tag}: {} → {}",
                    view.dataset.original_shape(),
                    view.dataset.shape()
                ));
            }
        });
}

/// An optional bound: unchecked means open-ended.
fn bound_editor(ui: &mut Ui, name: &str, bound: &mut Option<f64>, fallback: Option<f64>) {
    ui.horizontal(|ui: &mut Ui| {
        let mut enabled = bound.is_some();
        if ui.checkbox(&mut enabled, name).changed() {
            *bound = enabled.then(|| fallback.unwrap_or_default());
        }
        if let Some(value) = bound {
            ui.add(DragValue::new(value).speed(1.0).max_decimals(2));
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open parameters…").clicked() {
                open_params_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open light curve…").clicked() {
                open_light_curve_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.report("reload", |s| s.reload());
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export CSV").clicked() {
                state.report("export", |s| s.export_csv());
                ui.close_menu();
            }
            if ui.button("Save figure…").clicked() {
                save_figure_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.views.is_empty() {
            let (all, kept) = state.counts();
            ui.label(format!("{all} time bins loaded, {kept} pass the cuts"));
        }

        ui.separator();

        if ui.selectable_label(state.show_table, "Table").clicked() {
            state.show_table = !state.show_table;
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_params_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open parameter file")
        .add_filter("YAML", &["yaml", "yml"])
        .pick_file();

    if let Some(path) = file {
        state.report("load parameters", |s| s.load_params(&path));
    }
}

pub fn open_light_curve_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open light curve")
        .add_filter("Supported files", &["fits", "fit", "fts", "parquet", "pq", "json", "csv"])
        .add_filter("FITS", &["fits", "fit", "fts"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.report("load light curve", |s| s.load_data_file(&path));
    }
}

pub fn save_figure_dialog(state: &mut AppState) {
    let name = state
        .params
        .as_ref()
        .map(|p| p.plot.plot_name.clone())
        .unwrap_or_else(|| "light_curve.svg".into());

    let mut dialog = rfd::FileDialog::new()
        .set_title("Save figure")
        .set_file_name(name)
        .add_filter("SVG", &["svg"]);
    if cfg!(feature = "png") {
        dialog = dialog.add_filter("PNG", &["png"]);
    }

    if let Some(path) = dialog.save_file() {
        state.report("save figure", |s| s.save_figure(&path));
    }
}

/// Convert a figure colour for egui.
pub fn to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}
