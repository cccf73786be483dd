mod app;
mod color;
mod config;
mod data;
mod error;
mod photo;
mod state;
mod ui;

use app::FleetKmViewerApp;
use config::ViewerConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::load().unwrap_or_else(|e| {
        log::warn!("{e}; using default settings");
        ViewerConfig::default()
    });
    log::debug!("Settings: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fleet KM Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(FleetKmViewerApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
