use eframe::egui::{self, ScrollArea, Ui};

use crate::data::model::DatasetKind;
use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CollegeExplorerApp {
    pub state: AppState,
}

impl CollegeExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

fn noun(kind: DatasetKind) -> &'static str {
    match kind {
        DatasetKind::HiddenGems => "College",
        DatasetKind::AccessibleExcellence => "Institution",
    }
}

impl eframe::App for CollegeExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map + tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central_panel(ui, &mut self.state);
        });
    }
}

fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.kind.title());
    ui.label(state.kind.tagline());
    ui.separator();

    let Some(loaded) = state.table.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore institutions  (File → Open…)");
        });
        return;
    };
    if loaded.is_empty() {
        ui.label("The loaded file contains no institutions.");
        return;
    }

    let noun = noun(loaded.kind);
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.checkbox(&mut state.show_map, "Show Map");
            if state.show_map {
                ui.strong(format!("{noun} Locations"));
                map::institution_map(ui, state);
            }

            ui.separator();
            ui.strong(format!("{noun} Data"));
            table::institution_table(ui, "matched", &loaded, &state.outcome.matched);

            ui.separator();
            egui::CollapsingHeader::new(format!("Filtered Out {noun}s"))
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    table::institution_table(ui, "unmatched", &loaded, &state.outcome.unmatched);
                });
        });
}
