mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::DashboardApp;
use config::Settings;
use data::cache::TableCache;
use data::pipeline::Pipeline;
use data::source::SourceFetcher;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env().context("reading settings")?;
    let catalog = settings.role_catalog()?;
    let fetcher = SourceFetcher::new(settings.fetch_timeout)?;
    let pipeline = Pipeline::new(Box::new(fetcher), TableCache::new(), catalog);

    let mut state = AppState::new(pipeline, settings.source.clone());
    state.reload();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SB Player Models",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
