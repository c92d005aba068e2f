use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
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
// Color mapping: system name → Color32
// ---------------------------------------------------------------------------

/// Assigns each reference system a distinct colour, in configuration order.
#[derive(Debug, Clone)]
pub struct SystemColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl SystemColors {
    pub fn new<'a>(systems: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = systems.into_iter().collect();
        let mapping = names
            .iter()
            .zip(generate_palette(names.len()))
            .map(|(name, c)| (name.to_string(), c))
            .collect();

        SystemColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a system.
    pub fn color_for(&self, system: &str) -> Color32 {
        self.mapping
            .get(system)
            .copied()
            .unwrap_or(self.default_color)
    }
}
