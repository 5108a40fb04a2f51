mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::GammaLcApp;
use clap::Parser;
use eframe::egui;

const DEFAULT_PARAMS: &str = "params.yaml";

#[derive(Parser, Debug)]
#[command(name = "gamma-lc")]
#[command(about = "Gamma-ray light-curve viewer")]
struct Args {
    /// Parameter file to open; ./params.yaml when present
    params: Option<PathBuf>,
}

fn main() -> eframe::Result {
    env_logger::init();

    // An explicit parameter file, or ./params.yaml when present.
    let params = Args::parse()
        .params
        .or_else(|| Some(PathBuf::from(DEFAULT_PARAMS)).filter(|p| p.exists()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gamma LC – Light-Curve Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(GammaLcApp::new(params.as_deref())))),
    )
}
