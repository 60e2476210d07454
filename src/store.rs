//! # Report Store
//!
//! Holds the live snapshot of the three streamed collections. Each ingest
//! replaces the whole triple behind one `Arc`, so a consumer holding a
//! snapshot always sees a consistent set and new consumers see the complete
//! replacement. Nothing here is ever mutated in place and no history is
//! retained.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Booth, Category, Report};

/// Immutable view of one ingest: the collections as delivered, plus the
/// lookup maps the analytics components resolve foreign keys through.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Reports in arrival order (the backend delivers ascending report time).
    pub reports: Vec<Report>,
    pub categories: Vec<Category>,
    pub booths: Vec<Booth>,
    /// categoryID -> lowercased category name.
    pub category_names: HashMap<String, String>,
    /// lowercased category name -> categoryID.
    pub category_ids: HashMap<String, String>,
    /// locationID -> booth tag.
    pub booth_tags: HashMap<String, String>,
    /// booth tag -> booth display name.
    pub booth_names: HashMap<String, String>,
}

impl Snapshot {
    fn build(reports: Vec<Report>, categories: Vec<Category>, booths: Vec<Booth>) -> Self {
        let mut category_names = HashMap::with_capacity(categories.len());
        let mut category_ids = HashMap::with_capacity(categories.len());
        for category in &categories {
            let name = category.name.to_lowercase();
            category_names.insert(category.id.clone(), name.clone());
            category_ids.insert(name, category.id.clone());
        }

        let mut booth_tags = HashMap::with_capacity(booths.len());
        let mut booth_names = HashMap::with_capacity(booths.len());
        for booth in &booths {
            booth_tags.insert(booth.id.clone(), booth.tag.clone());
            booth_names.insert(booth.tag.clone(), booth.name.clone());
        }

        Self {
            reports,
            categories,
            booths,
            category_names,
            category_ids,
            booth_tags,
            booth_names,
        }
    }

    /// Reports matching the filter, in arrival order.
    pub fn filtered_reports(&self, filter: &ReportFilter) -> Vec<Report> {
        self.reports
            .iter()
            .filter(|report| filter.matches(report))
            .cloned()
            .collect()
    }
}

/// Optional predicates over the report snapshot. The default filter
/// matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportFilter {
    /// Keep only reports with this exact categoryID.
    pub category_id: Option<String>,
    /// Keep only reports carrying an image URL.
    pub with_image: bool,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(category_id) = &self.category_id {
            if &report.category_id != category_id {
                return false;
            }
        }
        if self.with_image && report.image_url.is_none() {
            return false;
        }
        true
    }
}

/// The one piece of shared state in the dashboard: the current snapshot,
/// replaced atomically on every backend push.
#[derive(Clone, Debug, Default)]
pub struct ReportStore {
    current: Arc<Snapshot>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot with the delivered triple. Consumers
    /// never observe a partially-updated state: the previous `Arc` stays
    /// intact for anyone still holding it.
    pub fn ingest(&mut self, reports: Vec<Report>, categories: Vec<Category>, booths: Vec<Booth>) {
        tracing::debug!(
            reports = reports.len(),
            categories = categories.len(),
            booths = booths.len(),
            "ingesting snapshot"
        );
        self.current = Arc::new(Snapshot::build(reports, categories, booths));
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Current reports matching the filter, in arrival order.
    pub fn reports(&self, filter: &ReportFilter) -> Vec<Report> {
        self.current.filtered_reports(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(id: &str, category_id: &str, image_url: Option<&str>) -> Report {
        Report {
            id: Some(id.to_string()),
            category_id: category_id.to_string(),
            description: String::new(),
            location_id: "loc-1".to_string(),
            report_time: "2025-07-25T10:00:00Z".parse().unwrap(),
            volunteer_id: "vol-1".to_string(),
            image_url: image_url.map(str::to_string),
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn booth(id: &str, tag: &str, name: &str) -> Booth {
        Booth {
            id: id.to_string(),
            hall: "A".to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }

    #[test]
    fn test_ingest_builds_lookup_maps() {
        let mut store = ReportStore::new();
        store.ingest(
            vec![],
            vec![category("cat-1", "Trash")],
            vec![booth("loc-1", "A1", "Coffee Stand")],
        );

        let snap = store.snapshot();
        assert_eq!(snap.category_names.get("cat-1"), Some(&"trash".to_string()));
        assert_eq!(snap.category_ids.get("trash"), Some(&"cat-1".to_string()));
        assert_eq!(snap.booth_tags.get("loc-1"), Some(&"A1".to_string()));
        assert_eq!(snap.booth_names.get("A1"), Some(&"Coffee Stand".to_string()));
    }

    #[test]
    fn test_held_snapshot_survives_later_ingest() {
        let mut store = ReportStore::new();
        store.ingest(vec![report("r1", "cat-1", None)], vec![], vec![]);

        let held = store.snapshot();
        store.ingest(vec![], vec![], vec![]);

        assert_eq!(held.reports.len(), 1);
        assert_eq!(store.snapshot().reports.len(), 0);
    }

    #[test]
    fn test_filters_compose_and_preserve_order() {
        let mut store = ReportStore::new();
        store.ingest(
            vec![
                report("r1", "cat-1", Some("https://cdn.example/1.jpg")),
                report("r2", "cat-2", Some("https://cdn.example/2.jpg")),
                report("r3", "cat-1", None),
                report("r4", "cat-1", Some("https://cdn.example/4.jpg")),
            ],
            vec![],
            vec![],
        );

        let all = store.reports(&ReportFilter::default());
        let ids: Vec<&str> = all.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3", "r4"]);

        let filtered = store.reports(&ReportFilter {
            category_id: Some("cat-1".to_string()),
            with_image: true,
        });
        let ids: Vec<&str> = filtered.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["r1", "r4"]);
    }
}
