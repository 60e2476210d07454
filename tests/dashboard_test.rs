use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use fdreports::app::{listeners, App};
use fdreports::backend::{DocumentBackend, MemoryBackend};

fn seeded_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend
        .seed_from_json(&json!({
            "Categories": [
                {"id": "cat-trash", "name": "Trash"},
                {"id": "cat-crowd", "name": "Crowd"},
            ],
            "Booths": [
                {"id": "loc-a1", "hall": "A", "name": "Coffee Stand", "tag": "A1"},
                {"id": "loc-b2", "hall": "B", "name": "Main Stage", "tag": "B2"},
            ],
            "Users": [
                {"id": "vol-1", "name": "Sam", "role": "volunteer"},
            ],
            "Reports": [
                {
                    "id": "r1",
                    "categoryID": "cat-trash",
                    "description": "Trash near stage!",
                    "locationID": "loc-a1",
                    "reportTime": "2025-07-25T09:10:00Z",
                    "volunteerID": "vol-1",
                },
                {
                    "id": "r2",
                    "categoryID": "cat-trash",
                    "description": "trash bin full",
                    "locationID": "loc-a1",
                    "reportTime": "2025-07-25T09:40:00Z",
                    "volunteerID": "vol-1",
                    "imageURL": "https://cdn.example/r2.jpg",
                },
                {
                    "id": "r3",
                    "categoryID": "cat-crowd",
                    "description": "queue long",
                    "locationID": "loc-b2",
                    "reportTime": "2025-07-25T10:05:00Z",
                    "volunteerID": "vol-1",
                },
                {
                    // missing locationID, must be skipped at decode time
                    "id": "r4",
                    "categoryID": "cat-trash",
                    "description": "broken document",
                    "reportTime": "2025-07-25T10:10:00Z",
                    "volunteerID": "vol-1",
                },
            ],
        }))
        .unwrap();
    backend
}

/// Poll the shared app state until `predicate` holds or the deadline hits.
async fn wait_for(app: &Arc<Mutex<App>>, predicate: impl Fn(&App) -> bool) {
    for _ in 0..100 {
        {
            let app = app.lock().unwrap();
            if predicate(&app) {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("app state never reached the expected shape");
}

#[tokio::test]
async fn test_full_dashboard_flow() {
    let backend = seeded_backend();
    let shared: Arc<dyn DocumentBackend> = Arc::new(backend);
    let app = Arc::new(Mutex::new(App::default()));

    listeners::spawn_listeners(Arc::clone(&app), Arc::clone(&shared));
    wait_for(&app, |app| {
        app.category_data.len() == 2 && !app.volunteer_names.is_empty()
    })
    .await;

    let state = app.lock().unwrap();

    // The malformed report was skipped; three survive, in reportTime order.
    let snap = state.store.snapshot();
    let ids: Vec<&str> = snap.reports.iter().filter_map(|r| r.id.as_deref()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);

    // Category breakdown: trash 2 of 3, crowd 1 of 3.
    assert_eq!(state.category_data[0].name, "trash");
    assert_eq!(state.category_data[0].count, 2);
    assert!((state.category_data[0].percentage - 66.67).abs() < 0.01);
    assert_eq!(state.category_data[1].name, "crowd");
    assert!((state.category_data[1].percentage - 33.33).abs() < 0.01);

    // Keywords: "trash" appears twice and ranks first.
    assert_eq!(state.keyword_data[0].word, "trash");
    assert_eq!(state.keyword_data[0].count, 2);
    assert!(state.keyword_data.len() <= 5);

    // Hourly chart is dense regardless of the selected date.
    assert_eq!(state.hourly_data.len(), 24);

    // Heatmap (default category trash): A1 hot, B2 idle at minimum level.
    let a1 = state.heatmap_data.iter().find(|c| c.tag == "A1").unwrap();
    assert_eq!(a1.count, 2);
    assert_eq!(a1.level, 0.3);
    let b2 = state.heatmap_data.iter().find(|c| c.tag == "B2").unwrap();
    assert_eq!(b2.count, 0);
    assert_eq!(b2.level, 0.1);

    assert_eq!(state.volunteer_display_name("vol-1"), "Sam");
}

#[tokio::test]
async fn test_delete_propagates_a_fresh_snapshot() {
    let backend = seeded_backend();
    let shared: Arc<dyn DocumentBackend> = Arc::new(backend);
    let app = Arc::new(Mutex::new(App::default()));

    listeners::spawn_listeners(Arc::clone(&app), Arc::clone(&shared));
    wait_for(&app, |app| app.store.snapshot().reports.len() == 3).await;

    // A consumer holding the old snapshot keeps a consistent view.
    let held = app.lock().unwrap().store.snapshot();

    listeners::delete_report(Arc::clone(&shared), "r3".to_string());
    wait_for(&app, |app| app.store.snapshot().reports.len() == 2).await;

    assert_eq!(held.reports.len(), 3);

    let state = app.lock().unwrap();
    assert_eq!(state.category_data.len(), 1);
    assert_eq!(state.category_data[0].name, "trash");
    assert!((state.category_data[0].percentage - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_added_report_reaches_every_aggregate() {
    let backend = seeded_backend();
    let shared: Arc<dyn DocumentBackend> = Arc::new(backend);
    let app = Arc::new(Mutex::new(App::default()));

    listeners::spawn_listeners(Arc::clone(&app), Arc::clone(&shared));
    wait_for(&app, |app| app.store.snapshot().reports.len() == 3).await;

    let report = fdreports::Report {
        id: None,
        category_id: "cat-crowd".to_string(),
        description: "crowd crush risk at the gate".to_string(),
        location_id: "loc-b2".to_string(),
        report_time: "2025-07-25T11:00:00Z".parse().unwrap(),
        volunteer_id: "vol-1".to_string(),
        image_url: None,
    };
    listeners::submit_report(Arc::clone(&shared), report);
    wait_for(&app, |app| app.store.snapshot().reports.len() == 4).await;

    let mut state = app.lock().unwrap();
    assert_eq!(state.category_data[0].count, 2);
    assert_eq!(state.category_data[1].count, 2);

    state.set_heatmap_category("crowd".to_string());
    let b2 = state.heatmap_data.iter().find(|c| c.tag == "B2").unwrap();
    assert_eq!(b2.count, 2);
}
