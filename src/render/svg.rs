use std::fmt::Write as FmtWrite;

use super::axes::Axis;
use super::{Figure, Rgb, Series};

/// Points per inch.
pub const PT_PER_INCH: f64 = 72.0;

const TITLE_SIZE: f64 = 25.0;
const LABEL_SIZE: f64 = 30.0;
const TICK_SIZE: f64 = 30.0;
const TICK_LENGTH: f64 = 10.0;
const MARKER_RADIUS: f64 = 3.0;
const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";
const FRAME: Rgb = Rgb(0, 0, 0);

/// Plot area in points.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

/// Immediate-mode SVG document.
struct SvgDoc {
    width: f64,
    height: f64,
    body: String,
}

impl SvgDoc {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::with_capacity(16 * 1024),
        }
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb, width: f64) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{}" stroke-width="{width}" />"#,
            color.to_hex()
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: Rgb, width: f64) {
        let mut pts = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            if i > 0 {
                pts.push(' ');
            }
            let _ = write!(pts, "{x:.2},{y:.2}");
        }
        let _ = writeln!(
            self.body,
            r#"<polyline points="{pts}" fill="none" stroke="{}" stroke-width="{width}" stroke-linejoin="round" />"#,
            color.to_hex()
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgb) {
        let _ = writeln!(
            self.body,
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="{}" />"#,
            color.to_hex()
        );
    }

    fn rect_outline(&mut self, area: PlotArea, color: Rgb, width: f64) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="{width}" />"#,
            area.left,
            area.top,
            area.right - area.left,
            area.bottom - area.top,
            color.to_hex()
        );
    }

    fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str, rotate: Option<f64>) {
        let transform = rotate
            .map(|a| format!(r#" transform="rotate({a} {x:.2} {y:.2})""#))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="{FONT_FAMILY}" font-size="{size}" text-anchor="{anchor}"{transform}>{}</text>"#,
            escape_xml(content)
        );
    }

    fn finish(self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        let _ = writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, self.width, self.height);
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Data extent over all series, error bars included.
fn data_bounds(series: &[Series]) -> ((f64, f64), (f64, f64)) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for s in series {
        for ((&xi, &yi), &ei) in s.x.iter().zip(&s.y).zip(&s.yerr) {
            x = (x.0.min(xi), x.1.max(xi));
            let e = if ei.is_finite() { ei } else { 0.0 };
            if yi.is_finite() {
                y = (y.0.min(yi - e), y.1.max(yi + e));
            }
        }
    }
    (x, y)
}

/// Render an error-bar chart of `figure` as an SVG document.
pub fn render_svg(figure: &Figure) -> String {
    let width = figure.width_in * PT_PER_INCH;
    let height = figure.height_in * PT_PER_INCH;
    let area = PlotArea {
        left: TICK_SIZE * 4.0 + LABEL_SIZE * 1.6,
        top: TITLE_SIZE * 2.2,
        right: width - 30.0,
        bottom: height - (TICK_SIZE * 1.6 + LABEL_SIZE * 1.8),
    };

    let ((x_min, x_max), (y_min, y_max)) = data_bounds(&figure.series);
    let x_axis = Axis::auto(x_min, x_max, 8);
    let y_axis = Axis::auto(y_min, y_max, 6);
    let px = |v: f64| x_axis.to_pixel(v, area.left, area.right);
    let py = |v: f64| y_axis.to_pixel(v, area.bottom, area.top);

    let mut doc = SvgDoc::new(width, height);

    // Ticks point inward on all four sides.
    for (t, label) in x_axis.ticks.iter().zip(&x_axis.labels) {
        let x = px(*t);
        doc.line(x, area.bottom, x, area.bottom - TICK_LENGTH, FRAME, 1.0);
        doc.line(x, area.top, x, area.top + TICK_LENGTH, FRAME, 1.0);
        doc.text(x, area.bottom + TICK_SIZE * 1.1, label, TICK_SIZE, "middle", None);
    }
    for (t, label) in y_axis.ticks.iter().zip(&y_axis.labels) {
        let y = py(*t);
        doc.line(area.left, y, area.left + TICK_LENGTH, y, FRAME, 1.0);
        doc.line(area.right, y, area.right - TICK_LENGTH, y, FRAME, 1.0);
        doc.text(area.left - 8.0, y + TICK_SIZE * 0.35, label, TICK_SIZE, "end", None);
    }

    for series in &figure.series {
        let points: Vec<(f64, f64)> = series
            .x
            .iter()
            .zip(&series.y)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| (px(x), py(y)))
            .collect();

        for ((&x, &y), &e) in series.x.iter().zip(&series.y).zip(&series.yerr) {
            if x.is_finite() && y.is_finite() && e.is_finite() {
                doc.line(px(x), py(y - e), px(x), py(y + e), series.error_color, series.line_width);
            }
        }
        doc.polyline(&points, series.line_color, series.line_width);
        for &(x, y) in &points {
            doc.circle(x, y, MARKER_RADIUS, series.line_color);
        }
    }

    doc.rect_outline(area, FRAME, 1.0);

    // Legend, upper right.
    let mut ly = area.top + LABEL_SIZE * 1.2;
    for series in &figure.series {
        let lx = area.right - LABEL_SIZE * 0.6 * (series.label.chars().count() as f64 + 3.0);
        doc.line(lx, ly - LABEL_SIZE * 0.3, lx + LABEL_SIZE * 1.2, ly - LABEL_SIZE * 0.3, series.line_color, series.line_width);
        doc.circle(lx + LABEL_SIZE * 0.6, ly - LABEL_SIZE * 0.3, MARKER_RADIUS, series.line_color);
        doc.text(lx + LABEL_SIZE * 1.6, ly, &series.label, LABEL_SIZE, "start", None);
        ly += LABEL_SIZE * 1.3;
    }

    let cx = (area.left + area.right) / 2.0;
    doc.text(cx, TITLE_SIZE * 1.4, &figure.title, TITLE_SIZE, "middle", None);
    doc.text(cx, height - LABEL_SIZE * 0.5, &figure.x_label, LABEL_SIZE, "middle", None);
    let cy = (area.top + area.bottom) / 2.0;
    doc.text(LABEL_SIZE, cy, &figure.y_label, LABEL_SIZE, "middle", Some(-90.0));

    doc.finish()
}
