use std::path::Path;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct GammaLcApp {
    pub state: AppState,
}

impl GammaLcApp {
    /// Start with `params` shown, if given.
    pub fn new(params: Option<&Path>) -> Self {
        let mut app = Self::default();
        if let Some(path) = params {
            app.state.report("load parameters", |s| s.load_params(path));
        }
        app
    }
}

impl eframe::App for GammaLcApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot or table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.show_table {
                table::light_curve_table(ui, &mut self.state);
            } else {
                plot::light_curve_plot(ui, &self.state);
            }
        });
    }
}
