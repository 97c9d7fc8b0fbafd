mod analyzers;
mod api;
mod app;
mod color;
mod config;
mod export;
mod layout;
mod state;
mod ui;
mod upload;
mod worker;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use app::InsightApp;
use eframe::egui;

use crate::api::{ApiClient, Backend};
use crate::config::Config;

fn main() -> anyhow::Result<()> {
    let dotenv_error = config::load_dotenv();
    env_logger::init();
    if let Some(e) = dotenv_error {
        log::warn!("Ignoring malformed .env file: {e}");
    }

    let config = Config::from_env().context("reading configuration")?;
    log::info!("Using analysis backend at {}", config.api_url);
    let backend: Arc<dyn Backend> =
        Arc::new(ApiClient::new(&config).context("building HTTP client")?);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Insight – Analytics Dashboard",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render the Benford plot PNGs.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(InsightApp::new(cc, backend)))
        }),
    )
    .map_err(|e| anyhow!("running the dashboard: {e}"))
}
