/// Benchmark module for the aggregation hot paths: the four derived views
/// recomputed in full on every snapshot delivery.
use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, Criterion};

use fdreports::analytics::{
    category_breakdown, category_report_counts, hourly_counts, tag_intensities, top_keywords,
    IntensityScale,
};
use fdreports::config::TimeReference;
use fdreports::types::Report;

const CATEGORIES: [(&str, &str); 3] = [
    ("cat-trash", "trash"),
    ("cat-crowd", "crowd"),
    ("cat-queue", "queue"),
];

const DESCRIPTIONS: [&str; 4] = [
    "Trash near stage, bins overflowing",
    "queue long at the west entrance",
    "crowd pressure by the main stage",
    "trash bag split next to booth",
];

/// One event day of synthetic reports, deterministic so runs compare.
fn synthetic_reports(count: usize) -> Vec<Report> {
    (0..count)
        .map(|i| {
            let (category_id, _) = CATEGORIES[i % CATEGORIES.len()];
            let hour = 9 + (i % 12);
            let minute = i % 60;
            Report {
                id: Some(format!("r{i}")),
                category_id: category_id.to_string(),
                description: DESCRIPTIONS[i % DESCRIPTIONS.len()].to_string(),
                location_id: format!("loc-{}", i % 40),
                report_time: format!("2025-07-25T{hour:02}:{minute:02}:00Z")
                    .parse()
                    .unwrap(),
                volunteer_id: format!("vol-{}", i % 25),
                image_url: None,
            }
        })
        .collect()
}

fn category_names() -> HashMap<String, String> {
    CATEGORIES
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect()
}

fn category_ids() -> HashMap<String, String> {
    CATEGORIES
        .iter()
        .map(|(id, name)| (name.to_string(), id.to_string()))
        .collect()
}

fn booth_tags() -> HashMap<String, String> {
    (0..40)
        .map(|i| (format!("loc-{i}"), format!("{}{}", (b'A' + (i % 6) as u8) as char, i)))
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let reports = synthetic_reports(5_000);
    let names = category_names();

    group.bench_function("category_breakdown", |b| {
        b.iter(|| category_breakdown(&reports, &names));
    });

    group.bench_function("top_keywords", |b| {
        b.iter(|| {
            top_keywords(
                reports.iter().map(|report| report.description.as_str()),
                5,
            )
        });
    });

    group.bench_function("hourly_counts", |b| {
        let date = "2025-07-25".parse().unwrap();
        let utc = TimeReference::VenueOffset { minutes_east: 0 };
        b.iter(|| hourly_counts(&reports, Some(date), &utc));
    });

    group.finish();
}

fn bench_heatmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heatmap");
    let reports = synthetic_reports(5_000);
    let ids = category_ids();
    let tags = booth_tags();
    let scale = IntensityScale::default();

    group.bench_function("category_report_counts", |b| {
        b.iter(|| category_report_counts(&reports, "trash", &ids, &tags));
    });

    group.bench_function("tag_intensities", |b| {
        let counts = category_report_counts(&reports, "trash", &ids, &tags);
        b.iter(|| tag_intensities(&tags, &counts, &scale));
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_aggregation, bench_heatmap
);
criterion_main!(benches);
