use std::ops::RangeInclusive;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::NumericRange;
use crate::data::model::{DatasetKind, InstitutionTable};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(warning) = &state.warning {
                ui.label(RichText::new(warning).color(Color32::YELLOW));
                ui.separator();
            }

            match table.kind {
                DatasetKind::HiddenGems => changed |= threshold_filters(ui, state),
                DatasetKind::AccessibleExcellence => changed |= category_filters(ui, state, &table),
            }

            ui.separator();
            ui.strong("Search for an institution");
            changed |= ui
                .text_edit_singleline(&mut state.constraints.name_substring)
                .changed();

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }

            ui.separator();
            ui.strong("Debug Information:");
            ui.label(format!("Total: {}", state.outcome.total()));
            ui.label(format!("Displayed: {}", state.outcome.matched.len()));
            ui.label(format!("Filtered out: {}", state.outcome.unmatched.len()));
        });

    // Recompute the outcome after any widget change.
    if changed {
        state.refilter();
    }
}

/// Sliders of the Hidden Gems dashboard.
fn threshold_filters(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;
    let c = &mut state.constraints;

    if let Some(range) = c.admission_rate.as_mut() {
        changed |= range_filter(ui, "Admission Rate", range, 0.0..=1.0, true);
    }
    if let Some(range) = c.graduation_rate.as_mut() {
        changed |= range_filter(ui, "Graduation Rate", range, 0.0..=1.0, true);
    }
    match (state.ratio_bounds, c.earnings_ratio.as_mut()) {
        (Some(bounds), Some(range)) if bounds.enabled => {
            changed |= range_filter(
                ui,
                "Earnings to Price Ratio",
                range,
                bounds.range.low..=bounds.range.high,
                false,
            );
        }
        _ => {}
    }
    changed
}

/// A min / max slider pair for a closed range.
fn range_filter(
    ui: &mut Ui,
    label: &str,
    range: &mut NumericRange,
    bounds: RangeInclusive<f64>,
    percent: bool,
) -> bool {
    ui.strong(label);
    let low_changed = ui
        .add(bounded_slider(&mut range.low, bounds.clone(), "min", percent))
        .changed();
    let high_changed = ui
        .add(bounded_slider(&mut range.high, bounds, "max", percent))
        .changed();
    // Keep low <= high, moving whichever handle the user didn't touch.
    if range.low > range.high {
        if low_changed {
            range.high = range.low;
        } else {
            range.low = range.high;
        }
    }
    low_changed || high_changed
}

fn bounded_slider<'a>(
    value: &'a mut f64,
    bounds: RangeInclusive<f64>,
    text: &str,
    percent: bool,
) -> egui::Slider<'a> {
    let slider = egui::Slider::new(value, bounds).text(text);
    if percent {
        slider.custom_formatter(|v, _| format!("{:.0}%", v * 100.0))
    } else {
        slider.max_decimals(2)
    }
}

/// Multi-selects of the Accessible Excellence dashboard.
fn category_filters(ui: &mut Ui, state: &mut AppState, table: &Arc<InstitutionTable>) -> bool {
    let mut changed = false;

    if let Some(selected) = state.constraints.fit_ratings.as_mut() {
        changed |= multi_select(ui, "Select Fit Ratings", selected, &table.fit_ratings, |v| {
            v.clone().unwrap_or_else(|| "(missing)".into())
        });
    }
    if let Some(selected) = state.constraints.institution_types.as_mut() {
        changed |= multi_select(
            ui,
            "Select Institution Types",
            selected,
            &table.institution_types,
            |v| v.map_or_else(|| "(missing)".into(), |t| t.to_string()),
        );
    }

    let n_selected = state.constraints.states.len();
    egui::CollapsingHeader::new(RichText::new(format!("Select States  ({n_selected} selected)")).strong())
        .id_salt("states")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.constraints.states.clear();
                changed = true;
            }
            for st in &table.states {
                let mut checked = state.constraints.states.contains(st);
                if ui.checkbox(&mut checked, st.as_str()).changed() {
                    if checked {
                        state.constraints.states.insert(st.clone());
                    } else {
                        state.constraints.states.remove(st);
                    }
                    changed = true;
                }
            }
        });

    changed
}

/// Collapsible checkbox list with All / None buttons.
fn multi_select<T: Ord + Clone>(
    ui: &mut Ui,
    title: &str,
    selected: &mut std::collections::BTreeSet<T>,
    all_values: &std::collections::BTreeSet<T>,
    label: impl Fn(&T) -> String,
) -> bool {
    let mut changed = false;
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = all_values.clone();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for val in all_values {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, label(val)).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.table.is_some(), egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let current = state.kind;
        egui::ComboBox::from_id_salt("dashboard")
            .selected_text(current.title())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in DatasetKind::ALL {
                    if ui.selectable_label(current == kind, kind.title()).clicked() {
                        state.set_kind(kind);
                    }
                }
            });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} institutions loaded, {} shown",
                table.len(),
                state.outcome.matched.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open admissions data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered institutions")
        .set_file_name("filtered.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_matched(&path);
    }
}
