use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// The first hue is blue, matching the single-source figure.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (240.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Source → colour
// ---------------------------------------------------------------------------

/// Assigns each displayed source a distinct colour.
#[derive(Debug, Clone)]
pub struct SourceColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl SourceColors {
    /// Colours for `tags`, in the order given.
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Self {
        let palette = generate_palette(tags.len());
        let mapping = tags
            .iter()
            .zip(palette)
            .map(|(t, c)| (t.as_ref().to_string(), c))
            .collect();

        SourceColors {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    pub fn color_for(&self, tag: &str) -> Color32 {
        self.mapping.get(tag).copied().unwrap_or(self.default_color)
    }

    /// Legend entries (tag → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(t, c)| (t.clone(), *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn first_colour_is_blue() {
        let c = generate_palette(1)[0];
        assert!(c.b() > c.r() && c.b() > c.g());
    }

    #[test]
    fn unknown_tag_gets_default() {
        let colors = SourceColors::new(&["4C +01.02", "PKS 0903-57"]);
        assert_ne!(colors.color_for("4C +01.02"), colors.color_for("PKS 0903-57"));
        assert_eq!(colors.color_for("S4 0954+65"), Color32::LIGHT_BLUE);
        assert_eq!(colors.legend_entries().len(), 2);
    }
}
