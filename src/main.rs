mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::CollegeExplorerApp;
use clap::Parser;
use data::filter::DEFAULT_RATIO_CAP;
use data::model::DatasetKind;
use eframe::egui;
use state::AppState;

/// Explore admissions datasets on a map and a filterable table.
#[derive(Parser, Debug)]
#[command(name = "college-explorer", version, about)]
struct Cli {
    /// Dataset to open on start-up (.csv, .json, .parquet)
    file: Option<PathBuf>,

    /// Which dashboard the file feeds
    #[arg(short, long, value_enum, default_value_t = DatasetKind::HiddenGems)]
    dashboard: DatasetKind,

    /// Upper cap of the earnings-to-price slider
    #[arg(long, default_value_t = DEFAULT_RATIO_CAP)]
    ratio_cap: f64,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("{cli:?}");

    let mut state = AppState::new(cli.dashboard, cli.ratio_cap);
    if let Some(path) = &cli.file {
        state.load(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "College Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(CollegeExplorerApp::new(state)))),
    )
}
