use std::collections::BTreeMap;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Plot, PlotBounds, PlotPoint, PlotPoints, Points};

use crate::color::category_of;
use crate::data::model::{DatasetKind, InstitutionTable};
use crate::state::AppState;
use crate::ui::table::{format_currency, format_percent, format_ratio};

// ---------------------------------------------------------------------------
// Institution map (central panel)
// ---------------------------------------------------------------------------

/// Scatter the matched institutions by longitude / latitude, one series per
/// colour category.
pub fn institution_map(ui: &mut Ui, state: &AppState) {
    let (Some(table), Some(color_map)) = (&state.table, &state.color_map) else {
        return;
    };

    let indices = state.map_indices();
    if indices.is_empty() {
        ui.label(
            RichText::new("No colleges to display on the map based on current filters.")
                .color(Color32::YELLOW),
        );
        return;
    }

    let mut series: BTreeMap<Option<String>, Vec<[f64; 2]>> = BTreeMap::new();
    for &idx in &indices {
        let rec = &table.records[idx];
        if let Some((lat, lon)) = rec.coordinates() {
            series
                .entry(category_of(table.kind, rec))
                .or_default()
                .push([lon, lat]);
        }
    }

    let response = Plot::new("institution_map")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .height(500.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (category, coords) in series {
                let color = color_map.color_for(category.as_deref());
                let points: PlotPoints = coords.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(category.unwrap_or_else(|| "Unknown".to_string()))
                        .color(color)
                        .radius(4.0),
                );
            }
            let pointer = plot_ui.pointer_coordinate()?;
            nearest_institution(table, &indices, pointer, plot_ui.plot_bounds())
        });

    if let Some(idx) = response.inner {
        response
            .response
            .on_hover_ui_at_pointer(|ui: &mut Ui| hover_details(ui, table, idx));
    }
}

/// Closest mapped record to the pointer, if within 2% of the visible extent.
fn nearest_institution(
    table: &InstitutionTable,
    indices: &[usize],
    pointer: PlotPoint,
    bounds: PlotBounds,
) -> Option<usize> {
    let threshold = 0.02 * bounds.width().max(bounds.height());
    indices
        .iter()
        .filter_map(|&idx| {
            let (lat, lon) = table.records[idx].coordinates()?;
            let dist = ((lon - pointer.x).powi(2) + (lat - pointer.y).powi(2)).sqrt();
            (dist <= threshold).then_some((idx, dist))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx)
}

fn hover_details(ui: &mut Ui, table: &InstitutionTable, idx: usize) {
    let rec = &table.records[idx];
    ui.strong(rec.name.as_deref().unwrap_or("(unnamed)"));
    ui.label(format!(
        "{}, {}",
        rec.city.as_deref().unwrap_or_default(),
        rec.state.as_deref().unwrap_or_default()
    ));
    if let Some(ty) = rec.institution_type {
        ui.label(ty.to_string());
    }
    match table.kind {
        DatasetKind::HiddenGems => {
            ui.label(format!("Admission Rate: {}", format_percent(rec.admission_rate)));
            ui.label(format!(
                "Earnings to Price Ratio: {}",
                format_ratio(rec.earnings_to_price)
            ));
            ui.label(format!("Graduation Rate: {}", format_percent(rec.graduation_rate)));
            ui.label(format!("Four Year Cost: {}", format_currency(rec.four_year_cost)));
            ui.label(format!("Yield Rate: {}", format_percent(rec.yield_rate)));
        }
        DatasetKind::AccessibleExcellence => {
            ui.label(format!(
                "Fit Rating: {}",
                rec.fit_rating.as_deref().unwrap_or_default()
            ));
        }
    }
}
