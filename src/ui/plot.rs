use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use gamma_lc::render::{X_LABEL, Y_LABEL};

use crate::state::AppState;
use crate::ui::panels::to_color32;

// ---------------------------------------------------------------------------
// Light-curve plot (central panel)
// ---------------------------------------------------------------------------

/// Render the error-bar light curves of every displayed source.
pub fn light_curve_plot(ui: &mut Ui, state: &AppState) {
    if state.views.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a parameter file to view light curves  (File → Open parameters…)");
        });
        return;
    }

    // One source keeps the figure's own colours; several take the palette.
    let single = state.views.len() == 1;

    if let Some(title) = state.views.values().find_map(|v| v.figure.as_ref()).map(|f| &f.title) {
        if single {
            ui.vertical_centered(|ui: &mut Ui| ui.strong(title));
        }
    }

    let empty: Vec<&str> = state
        .views
        .iter()
        .filter(|(_, v)| v.figure.is_none())
        .map(|(t, _)| t.as_str())
        .collect();
    if !empty.is_empty() {
        ui.colored_label(
            Color32::from_rgb(200, 120, 0),
            format!("No time bins pass the selection for: {}", empty.join(", ")),
        );
    }

    Plot::new("light_curve_plot")
        .legend(Legend::default())
        .x_axis_label(X_LABEL)
        .y_axis_label(Y_LABEL)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (tag, view) in &state.views {
                let Some(figure) = &view.figure else {
                    continue;
                };
                for series in &figure.series {
                    let (line_color, error_color) = if single {
                        (to_color32(series.line_color), to_color32(series.error_color))
                    } else {
                        let c = state.colors.color_for(tag);
                        (c, c.gamma_multiply(0.6))
                    };

                    for ((&x, &y), &e) in series.x.iter().zip(&series.y).zip(&series.yerr) {
                        if e.is_finite() {
                            plot_ui.line(
                                Line::new(PlotPoints::new(vec![[x, y - e], [x, y + e]]))
                                    .color(error_color)
                                    .width(series.line_width as f32 * 0.75),
                            );
                        }
                    }

                    let points: PlotPoints = series.x.iter().zip(&series.y).map(|(&x, &y)| [x, y]).collect();
                    plot_ui.line(
                        Line::new(points)
                            .name(&series.label)
                            .color(line_color)
                            .width(series.line_width as f32),
                    );

                    let markers: PlotPoints = series.x.iter().zip(&series.y).map(|(&x, &y)| [x, y]).collect();
                    plot_ui.points(Points::new(markers).radius(3.0).color(line_color));
                }
            }
        });
}
