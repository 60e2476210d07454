use crate::plotting::{category_pie_png, hourly_spike_png, keyword_bars_png};
use crate::types::{CategoryCount, HourlyCount, KeywordCount};

const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

#[tokio::test]
async fn test_category_pie_renders_png() {
    let rows = vec![
        CategoryCount {
            name: "trash".to_string(),
            count: 2,
            percentage: 66.67,
        },
        CategoryCount {
            name: "crowd".to_string(),
            count: 1,
            percentage: 33.33,
        },
    ];
    let png = category_pie_png(rows).await.unwrap();
    assert_eq!(&png[..4], &PNG_MAGIC);
}

#[tokio::test]
async fn test_empty_charts_still_render() {
    let pie = category_pie_png(vec![]).await.unwrap();
    assert_eq!(&pie[..4], &PNG_MAGIC);

    let bars = keyword_bars_png(vec![]).await.unwrap();
    assert_eq!(&bars[..4], &PNG_MAGIC);
}

#[tokio::test]
async fn test_keyword_bars_render_png() {
    let rows = vec![
        KeywordCount {
            word: "trash".to_string(),
            count: 4,
        },
        KeywordCount {
            word: "queue".to_string(),
            count: 2,
        },
    ];
    let png = keyword_bars_png(rows).await.unwrap();
    assert_eq!(&png[..4], &PNG_MAGIC);
}

#[tokio::test]
async fn test_hourly_spike_renders_dense_day() {
    let rows: Vec<HourlyCount> = (0..24)
        .map(|hour| HourlyCount {
            hour,
            count: if hour == 14 { 7 } else { 0 },
        })
        .collect();
    let png = hourly_spike_png(rows).await.unwrap();
    assert_eq!(&png[..4], &PNG_MAGIC);
}

#[test]
fn test_identical_data_is_served_from_cache() {
    tokio_test::block_on(async {
        let rows = vec![KeywordCount {
            word: "cache".to_string(),
            count: 3,
        }];
        let first = keyword_bars_png(rows.clone()).await.unwrap();
        let second = keyword_bars_png(rows).await.unwrap();
        assert_eq!(first, second);
    });
}
