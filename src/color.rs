use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{DatasetKind, Institution, InstitutionTable};

const ORANGE: Color32 = Color32::from_rgb(255, 165, 0);
const GREEN: Color32 = Color32::from_rgb(0, 128, 0);
const RED: Color32 = Color32::from_rgb(220, 20, 20);

/// Fixed marker colours per dashboard; other categories get generated hues.
fn fixed_colors(kind: DatasetKind) -> &'static [(&'static str, Color32)] {
    match kind {
        DatasetKind::HiddenGems => &[("Public", ORANGE), ("Private", GREEN)],
        DatasetKind::AccessibleExcellence => &[("★★★", GREEN), ("★★☆", ORANGE), ("★☆☆", RED)],
    }
}

// ---------------------------------------------------------------------------
// Palette for categories without a fixed colour
// ---------------------------------------------------------------------------

const GOLDEN_ANGLE: f32 = 137.507_77;
const MIN_HUE_GAP: f32 = 20.0;
const HUE_ATTEMPTS: usize = 32;

fn hsl_color(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

fn hue_of(color: Color32) -> f32 {
    let rgb: Srgb = Srgb::new(color.r(), color.g(), color.b()).into_format();
    let hsl: Hsl = rgb.into_color();
    hsl.hue.into_positive_degrees()
}

/// Angular distance between two hues, in degrees.
fn hue_gap(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// `n` colours for categories beyond the fixed ones. Hues walk the golden
/// angle and skip anything within [`MIN_HUE_GAP`] of a colour already in use;
/// once the wheel is crowded the next hue is taken as is.
pub fn category_palette(fixed: &[Color32], n: usize) -> Vec<Color32> {
    let mut taken: Vec<f32> = fixed.iter().map(|c| hue_of(*c)).collect();
    let mut step = 0usize;
    let mut next_hue = || {
        let hue = (200.0 + step as f32 * GOLDEN_ANGLE).rem_euclid(360.0);
        step += 1;
        hue
    };

    let mut colors = Vec::with_capacity(n);
    for _ in 0..n {
        let mut hue = next_hue();
        for _ in 0..HUE_ATTEMPTS {
            if taken.iter().all(|t| hue_gap(hue, *t) >= MIN_HUE_GAP) {
                break;
            }
            hue = next_hue();
        }
        taken.push(hue);
        colors.push(hsl_color(hue));
    }
    colors
}

// ---------------------------------------------------------------------------
// Color mapping: map category → Color32
// ---------------------------------------------------------------------------

/// The category a record is coloured by: institution type for Hidden Gems,
/// fit rating for Accessible Excellence.
pub fn category_of(kind: DatasetKind, rec: &Institution) -> Option<String> {
    match kind {
        DatasetKind::HiddenGems => rec.institution_type.map(|t| t.label().to_string()),
        DatasetKind::AccessibleExcellence => rec.fit_rating.clone(),
    }
}

/// Maps the categories of a table to marker colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the categories present in `table`.
    pub fn for_table(table: &InstitutionTable) -> Self {
        let fixed = fixed_colors(table.kind);
        let mut mapping: BTreeMap<String, Color32> = fixed
            .iter()
            .map(|(label, color)| (label.to_string(), *color))
            .collect();

        let others: BTreeSet<String> = table
            .records
            .iter()
            .filter_map(|rec| category_of(table.kind, rec))
            .filter(|cat| !mapping.contains_key(cat))
            .collect();
        let fixed: Vec<Color32> = fixed.iter().map(|(_, color)| *color).collect();
        let palette = category_palette(&fixed, others.len());
        mapping.extend(others.into_iter().zip(palette));

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category; missing or unknown is grey.
    pub fn color_for(&self, category: Option<&str>) -> Color32 {
        category
            .and_then(|c| self.mapping.get(c))
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::InstitutionType;

    #[test]
    fn generated_hues_keep_clear_of_fixed_colours() {
        assert!(category_palette(&[ORANGE, GREEN], 0).is_empty());

        let colors = category_palette(&[ORANGE, GREEN, RED], 4);
        assert_eq!(colors.len(), 4);
        let fixed_hues = [hue_of(ORANGE), hue_of(GREEN), hue_of(RED)];
        for (i, c) in colors.iter().enumerate() {
            // Rounding to u8 moves the hue slightly.
            assert!(fixed_hues.iter().all(|h| hue_gap(hue_of(*c), *h) >= MIN_HUE_GAP - 1.0));
            assert!(colors[i + 1..].iter().all(|other| other != c));
        }
    }

    #[test]
    fn hue_gap_wraps_around() {
        assert_eq!(hue_gap(350.0, 10.0), 20.0);
        assert_eq!(hue_gap(10.0, 350.0), 20.0);
        assert_eq!(hue_gap(0.0, 180.0), 180.0);
    }

    #[test]
    fn fixed_and_generated_colours() {
        let records = vec![
            Institution {
                fit_rating: Some("★★★".into()),
                ..Default::default()
            },
            Institution {
                fit_rating: Some("Unrated".into()),
                ..Default::default()
            },
            Institution::default(),
        ];
        let table = InstitutionTable::from_records(DatasetKind::AccessibleExcellence, records, vec![]);
        let map = ColorMap::for_table(&table);

        assert_eq!(map.color_for(Some("★★★")), GREEN);
        assert_eq!(map.color_for(Some("★☆☆")), RED);
        assert_ne!(map.color_for(Some("Unrated")), Color32::GRAY);
        assert_eq!(map.color_for(None), Color32::GRAY);
    }

    #[test]
    fn gems_are_coloured_by_type() {
        let rec = Institution {
            institution_type: Some(InstitutionType::Private),
            fit_rating: Some("★★★".into()),
            ..Default::default()
        };
        assert_eq!(category_of(DatasetKind::HiddenGems, &rec).as_deref(), Some("Private"));
        assert_eq!(
            category_of(DatasetKind::AccessibleExcellence, &rec).as_deref(),
            Some("★★★")
        );
    }
}
