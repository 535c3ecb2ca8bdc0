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
            let hsl = Hsl::new(hue, 0.70, 0.50);
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
// Group name → Color32
// ---------------------------------------------------------------------------

/// Stable colour per admission group so the score and rank charts agree.
#[derive(Debug, Clone, Default)]
pub struct GroupColors {
    mapping: BTreeMap<String, Color32>,
}

impl GroupColors {
    pub fn new<'a>(groups: impl IntoIterator<Item = &'a String>) -> Self {
        let groups: Vec<&String> = groups.into_iter().collect();
        let palette = generate_palette(groups.len());
        let mapping = groups
            .into_iter()
            .zip(palette)
            .map(|(g, c)| (g.clone(), c))
            .collect();
        Self { mapping }
    }

    pub fn color_for(&self, group: &str) -> Color32 {
        self.mapping.get(group).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_group_is_gray() {
        let groups = vec!["a".to_string(), "b".to_string()];
        let colors = GroupColors::new(&groups);
        assert_ne!(colors.color_for("a"), colors.color_for("b"));
        assert_eq!(colors.color_for("zzz"), Color32::GRAY);
    }
}
