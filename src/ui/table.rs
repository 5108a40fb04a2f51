use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use gamma_lc::data::model::{COLUMN_NAMES, INDEX_NAME};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Tabular view of the bins passing the cuts, one source at a time.
pub fn light_curve_table(ui: &mut Ui, state: &mut AppState) {
    if state.views.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No light curve loaded.");
        });
        return;
    }

    let tag = match &state.table_tag {
        Some(t) if state.views.contains_key(t) => t.clone(),
        _ => match state.views.keys().next() {
            Some(t) => t.clone(),
            None => return,
        },
    };

    ui.horizontal(|ui: &mut Ui| {
        for t in state.views.keys() {
            if ui.selectable_label(*t == tag, t).clicked() {
                state.table_tag = Some(t.clone());
            }
        }
    });
    ui.separator();

    let Some(view) = state.views.get(&tag) else {
        return;
    };
    let bins = view.dataset.current().bins();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(80.0), COLUMN_NAMES.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            header.col(|ui| {
                ui.strong(INDEX_NAME);
            });
            for name in COLUMN_NAMES {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, bins.len(), |mut row| {
                let bin = &bins[row.index()];
                row.col(|ui| {
                    ui.label(format!("{:.3}", bin.time_index));
                });
                for value in bin.values() {
                    row.col(|ui| {
                        ui.label(format!("{value:.4e}"));
                    });
                }
            });
        });
}
