//! Backend subscription plumbing: one listener task per collection feeds
//! the shared app state, plus fire-and-forget CRUD actions for the views.
//!
//! Each task applies its snapshot under the app lock and the recompute
//! runs to completion before the lock is released, so snapshot
//! application is serialized; a delivery arriving mid-recompute waits in
//! its channel rather than interleaving.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::backend::{DocumentBackend, OrderBy, SnapshotEvent};
use crate::types::{Booth, Category, Report, User};

use super::state::App;

/// Subscribe to Reports, Categories and Booths and load the Users map.
/// The returned handles live as long as the app window; dropping the
/// subscriptions happens inside each task when its channel closes.
pub fn spawn_listeners(
    app: Arc<Mutex<App>>,
    backend: Arc<dyn DocumentBackend>,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_reports_listener(Arc::clone(&app), Arc::clone(&backend)),
        spawn_categories_listener(Arc::clone(&app), Arc::clone(&backend)),
        spawn_booths_listener(Arc::clone(&app), Arc::clone(&backend)),
        spawn_users_fetch(app, backend),
    ]
}

fn spawn_reports_listener(
    app: Arc<Mutex<App>>,
    backend: Arc<dyn DocumentBackend>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sub = backend.subscribe("Reports", None, Some(OrderBy::field("reportTime")));
        while let Some(event) = sub.next_event().await {
            match event {
                SnapshotEvent::Snapshot(docs) => {
                    let reports: Vec<Report> =
                        docs.iter().filter_map(Report::from_document).collect();
                    if let Ok(mut app) = app.lock() {
                        app.apply_reports(reports);
                    }
                }
                SnapshotEvent::Error(message) => {
                    tracing::warn!(%message, "reports subscription error, keeping last snapshot");
                    if let Ok(mut app) = app.lock() {
                        app.error_message = Some(message);
                    }
                }
            }
        }
    })
}

fn spawn_categories_listener(
    app: Arc<Mutex<App>>,
    backend: Arc<dyn DocumentBackend>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sub = backend.subscribe("Categories", None, None);
        while let Some(event) = sub.next_event().await {
            match event {
                SnapshotEvent::Snapshot(docs) => {
                    let categories: Vec<Category> =
                        docs.iter().filter_map(Category::from_document).collect();
                    if let Ok(mut app) = app.lock() {
                        app.apply_categories(categories);
                    }
                }
                SnapshotEvent::Error(message) => {
                    tracing::warn!(%message, "categories subscription error, keeping last snapshot");
                    if let Ok(mut app) = app.lock() {
                        app.error_message = Some(message);
                    }
                }
            }
        }
    })
}

fn spawn_booths_listener(
    app: Arc<Mutex<App>>,
    backend: Arc<dyn DocumentBackend>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sub = backend.subscribe("Booths", None, None);
        while let Some(event) = sub.next_event().await {
            match event {
                SnapshotEvent::Snapshot(docs) => {
                    let booths: Vec<Booth> = docs.iter().filter_map(Booth::from_document).collect();
                    if let Ok(mut app) = app.lock() {
                        app.apply_booths(booths);
                    }
                }
                SnapshotEvent::Error(message) => {
                    tracing::warn!(%message, "booths subscription error, keeping last snapshot");
                    if let Ok(mut app) = app.lock() {
                        app.error_message = Some(message);
                    }
                }
            }
        }
    })
}

/// Users change rarely; a one-shot read is enough for name resolution.
fn spawn_users_fetch(app: Arc<Mutex<App>>, backend: Arc<dyn DocumentBackend>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match backend.get_once("Users").await {
            Ok(docs) => {
                let names = docs
                    .iter()
                    .filter_map(User::from_document)
                    .map(|user| (user.id, user.name))
                    .collect();
                if let Ok(mut app) = app.lock() {
                    app.volunteer_names = names;
                }
            }
            Err(err) => tracing::warn!(%err, "failed to load users"),
        }
    })
}

/// Persist a new report. Failures are logged; the next snapshot delivery
/// reflects whatever actually landed.
pub fn submit_report(backend: Arc<dyn DocumentBackend>, report: Report) {
    tokio::spawn(async move {
        if let Err(err) = backend.add_document("Reports", report.to_fields()).await {
            tracing::warn!(%err, "failed to add report");
        }
    });
}

/// Replace a persisted report. Reports without an id have never been
/// stored and are skipped.
pub fn update_report(backend: Arc<dyn DocumentBackend>, report: Report) {
    let Some(id) = report.id.clone() else {
        tracing::warn!("cannot update a report that has no id");
        return;
    };
    tokio::spawn(async move {
        if let Err(err) = backend.set_document("Reports", &id, report.to_fields()).await {
            tracing::warn!(%err, report = %id, "failed to update report");
        }
    });
}

pub fn delete_report(backend: Arc<dyn DocumentBackend>, id: String) {
    tokio::spawn(async move {
        if let Err(err) = backend.delete_document("Reports", &id).await {
            tracing::warn!(%err, report = %id, "failed to delete report");
        }
    });
}
