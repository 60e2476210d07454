//! Per-category report counts and percentages, for the pie chart.

use std::collections::HashMap;

use crate::types::{CategoryCount, Report};

/// Count reports per resolved category name and attach each name's share
/// of the resolved total.
///
/// Reports whose `category_id` has no entry in `id_to_name` are excluded
/// from both the numerator and the denominator. The result is sorted by
/// count descending; equal counts keep first-encounter order (the sort is
/// stable). An empty input yields an empty result.
pub fn category_breakdown(
    reports: &[Report],
    id_to_name: &HashMap<String, String>,
) -> Vec<CategoryCount> {
    let mut rows: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for report in reports {
        let Some(name) = id_to_name.get(&report.category_id) else {
            tracing::debug!(category_id = %report.category_id, "report category does not resolve");
            continue;
        };
        match index.get(name) {
            Some(&i) => rows[i].count += 1,
            None => {
                index.insert(name.clone(), rows.len());
                rows.push(CategoryCount {
                    name: name.clone(),
                    count: 1,
                    percentage: 0.0,
                });
            }
        }
    }

    let total: usize = rows.iter().map(|row| row.count).sum();
    for row in &mut rows {
        row.percentage = if total == 0 {
            0.0
        } else {
            100.0 * row.count as f64 / total as f64
        };
    }

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report(category_id: &str) -> Report {
        Report {
            id: None,
            category_id: category_id.to_string(),
            description: String::new(),
            location_id: "loc-1".to_string(),
            report_time: "2025-07-25T10:00:00Z".parse().unwrap(),
            volunteer_id: "vol-1".to_string(),
            image_url: None,
        }
    }

    fn names(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    #[test]
    fn test_counts_and_percentages() {
        let reports = vec![report("trash-id"), report("trash-id"), report("crowd-id")];
        let mapping = names(&[("trash-id", "trash"), ("crowd-id", "crowd")]);

        let rows = category_breakdown(&reports, &mapping);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "trash");
        assert_eq!(rows[0].count, 2);
        assert!((rows[0].percentage - 66.6667).abs() < 0.01);
        assert_eq!(rows[1].name, "crowd");
        assert_eq!(rows[1].count, 1);
        assert!((rows[1].percentage - 33.3333).abs() < 0.01);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let reports = vec![
            report("a"),
            report("a"),
            report("b"),
            report("c"),
            report("c"),
            report("c"),
            report("dangling"),
        ];
        let mapping = names(&[("a", "trash"), ("b", "crowd"), ("c", "queue")]);

        let rows = category_breakdown(&reports, &mapping);
        let sum: f64 = rows.iter().map(|row| row.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unresolved_reports_are_excluded_entirely() {
        let reports = vec![report("known"), report("unknown")];
        let mapping = names(&[("known", "trash")]);

        let rows = category_breakdown(&reports, &mapping);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);
        // The dangling report is out of the denominator too.
        assert!((rows[0].percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        // queue is encountered before crowd; both end at count 2.
        let reports = vec![
            report("q"),
            report("c"),
            report("q"),
            report("c"),
            report("t"),
            report("t"),
            report("t"),
        ];
        let mapping = names(&[("q", "queue"), ("c", "crowd"), ("t", "trash")]);

        let rows = category_breakdown(&reports, &mapping);
        let order: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(order, vec!["trash", "queue", "crowd"]);
    }

    #[test]
    fn test_empty_input() {
        let rows = category_breakdown(&[], &HashMap::new());
        assert_eq!(rows, vec![]);
    }
}
