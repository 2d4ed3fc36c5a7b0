//! Turnout Dashboard - Voter Turnout Analysis & Interactive Drill-Down
//!
//! Loads constituency turnout statistics and shows four linked charts plus
//! three KPI summaries, filtered by year and constituency.

mod args;
mod charts;
mod dashboard;
mod data;
mod export;
mod gui;
mod state;
mod stats;

use anyhow::anyhow;
use args::Args;
use clap::Parser;
use dashboard::DashboardView;
use data::DataStore;
use eframe::egui;
use gui::DashboardApp;
use log::info;
use state::Selection;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Export the selected view without opening a window.
fn run_headless(args: &Args, store: &DataStore) -> anyhow::Result<()> {
    let selection = Selection::new(args.year, args.constituency.clone());
    let view = DashboardView::build(store, &selection)?;
    info!("Selection {}: {:?}", selection, view.kpis);

    if let Some(path) = &args.export_json {
        export::write_json(&view, path)?;
    }
    if let Some(dir) = &args.export_png {
        export::write_png_dir(&view, dir)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = DataStore::load_or_empty(&args.data, args.sheet.as_deref());
    info!(
        "{} rows, {} years, {} constituencies",
        store.row_count(),
        store.years().len(),
        store.constituencies().len()
    );

    if args.is_headless() {
        return run_headless(&args, &store);
    }

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Voter Turnout Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Voter Turnout Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, store, args)))),
    )
    .map_err(|e| anyhow!("{}", e))
}
