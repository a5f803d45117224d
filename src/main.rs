mod app;
mod camera;
mod chat;
mod cli;
mod config;
mod controller;
mod error;
mod gemini;
mod interface;
mod lighting;
mod logging;
mod math;
mod options;
mod renderer;
mod scene;
mod settings;
mod texture;
mod time;

use clap::Parser;
use eframe::egui;
use tracing::{info, warn};

use crate::app::OrbitalApp;
use crate::cli::CliArgs;
use crate::options::{default_config_dir, AppOptions};

fn main() -> eframe::Result<()> {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let (mut options, load_error) = match AppOptions::load_or_create(&config_dir) {
        Ok(options) => (options, None),
        Err(e) => (AppOptions::default(), Some(e)),
    };
    options.apply_cli_overrides(&args);

    logging::init_logging(options.debug.log_dir.as_deref(), cfg!(debug_assertions), Some(&options));
    if let Some(e) = load_error {
        warn!(error = %e, dir = %config_dir.display(), "falling back to default options");
    }
    info!(version = env!("CARGO_PKG_VERSION"), git = env!("GIT_HASH"), "starting");

    let title = options.window.title.clone();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([options.window.width, options.window.height])
            .with_title(&title),
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| Ok(Box::new(OrbitalApp::new(cc, &options)))),
    )
}
