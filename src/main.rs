//! FD Reports Dashboard
//!
//! A GUI dashboard for aggregating and visualizing event daily reports.

use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use eframe::egui;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use fdreports::app::{listeners, App, AppWrapper};
use fdreports::backend::{DocumentBackend, MemoryBackend};
use fdreports::config::{default_config_path, DashboardConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match default_config_path() {
        Some(path) => DashboardConfig::load_or_default(Some(&path))
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    // The hosted backend stays external; demo runs work against the
    // in-memory store, optionally seeded from a JSON file argument.
    let memory = MemoryBackend::new();
    if let Some(seed_path) = std::env::args().nth(1) {
        let raw = std::fs::read_to_string(&seed_path)
            .with_context(|| format!("reading seed file {seed_path}"))?;
        let seed = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {seed_path}"))?;
        let inserted = memory
            .seed_from_json(&seed)
            .with_context(|| format!("seeding backend from {seed_path}"))?;
        tracing::info!(inserted, "seeded backend from {seed_path}");
    }
    let backend: Arc<dyn DocumentBackend> = Arc::new(memory);

    let rt = Runtime::new().context("starting tokio runtime")?;
    rt.block_on(async {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1200.0, 800.0])
                .with_min_inner_size([800.0, 600.0])
                .with_title("FD Reports"),
            ..Default::default()
        };

        let app = Arc::new(Mutex::new(App::new(config)));
        listeners::spawn_listeners(Arc::clone(&app), Arc::clone(&backend));

        if let Err(e) = eframe::run_native(
            "FD Reports",
            options,
            Box::new(|cc| {
                if let Ok(mut app) = app.lock() {
                    app.egui_ctx = Some(cc.egui_ctx.clone());
                }
                Ok(Box::new(AppWrapper { app, backend }) as Box<dyn eframe::App>)
            }),
        ) {
            eprintln!("Error running application: {}", e);
        }
    });

    Ok(())
}
