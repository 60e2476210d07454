//! # FD Reports Dashboard Library
//!
//! `fdreports` is a desktop dashboard for event-staff daily reports.
//! Volunteers submit reports (category, location, description, optional
//! photo) to a document backend; the dashboard aggregates them live into
//! a category pie chart, a keyword frequency chart, an hourly time-series
//! and a per-booth occupancy heatmap, next to a report history with
//! delete capability.
//!
//! ## Features
//!
//! - Snapshot-replace ingestion of the Reports/Categories/Booths collections
//! - Category breakdown with stable count-descending ordering
//! - Keyword frequency extraction over report descriptions
//! - Dense 24-hour bucketing for any calendar date
//! - Booth occupancy intensity with configurable thresholds
//! - Pluggable document backend with push subscriptions
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use eframe::NativeOptions;
//! use fdreports::app::{listeners, App, AppWrapper};
//! use fdreports::backend::{DocumentBackend, MemoryBackend};
//!
//! let backend: Arc<dyn DocumentBackend> = Arc::new(MemoryBackend::new());
//! let app = Arc::new(Mutex::new(App::default()));
//! listeners::spawn_listeners(Arc::clone(&app), Arc::clone(&backend));
//!
//! eframe::run_native(
//!     "FD Reports",
//!     NativeOptions::default(),
//!     Box::new(|_cc| Ok(Box::new(AppWrapper { app, backend }))),
//! )
//! .unwrap();
//! ```

pub mod analytics;
pub mod app;
pub mod backend;
pub mod config;
pub mod plotting;
pub mod store;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use app::App as DashboardApp;
pub use config::DashboardConfig;
pub use store::{ReportFilter, ReportStore, Snapshot};
pub use types::Report;
