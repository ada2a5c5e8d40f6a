// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! Marki Mark - Main Entry Point
//!
//! A fast, modern Markdown viewer and editor. Built with Rust and egui.

mod app;
mod config;
mod error;
mod export;
mod files;
mod markdown;
mod state;
mod theme;
mod ui;

use app::MarkiMarkApp;
use config::FileStore;
use log::info;
use state::{TabSession, APP_TITLE};

const DEFAULT_WINDOW_SIZE: [f32; 2] = [1100.0, 780.0];
const MIN_WINDOW_SIZE: [f32; 2] = [400.0, 300.0];

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {} {}", APP_TITLE, env!("CARGO_PKG_VERSION"));

    // Restore starts before the window opens; files load once the app polls
    let store = FileStore::open_default();
    let session = TabSession::restore(store);

    let viewport = eframe::egui::ViewportBuilder::default()
        .with_title(APP_TITLE)
        .with_inner_size(DEFAULT_WINDOW_SIZE)
        .with_min_inner_size(MIN_WINDOW_SIZE);

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        native_options,
        Box::new(|cc| Ok(Box::new(MarkiMarkApp::new(cc, session)))),
    )
}
