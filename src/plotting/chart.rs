use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use once_cell::sync::Lazy;
use plotters::element::Pie;
use plotters::prelude::*;
use tokio::sync::Mutex as TokioMutex;

use crate::types::{CategoryCount, HourlyCount, KeywordCount};

use super::styles::{
    color_for_category, ChartStyle, ChartTheme, KEYWORD_BAR_COLOR, SPIKE_COLOR,
};

pub type PlotError = Box<dyn Error + Send + Sync>;

const PIE_SIZE: (u32, u32) = (480, 480);
const BAR_SIZE: (u32, u32) = (640, 400);
const SPIKE_SIZE: (u32, u32) = (640, 360);
const CACHE_TTL: Duration = Duration::from_secs(300);

// Charts are re-rendered on every snapshot; the cache absorbs repaints
// where the underlying data did not change.
static PLOT_CACHE: Lazy<Arc<TokioMutex<LruCache<PlotCacheKey, (Vec<u8>, Instant)>>>> =
    Lazy::new(|| {
        Arc::new(TokioMutex::new(LruCache::new(
            NonZeroUsize::new(10).expect("cache capacity is non-zero"),
        )))
    });

#[derive(Clone, Hash, Eq, PartialEq)]
enum ChartKind {
    CategoryPie,
    KeywordBars,
    HourlySpike,
}

#[derive(Clone, Hash, Eq, PartialEq)]
struct PlotCacheKey {
    kind: ChartKind,
    data_hash: u64,
}

impl PlotCacheKey {
    fn category(rows: &[CategoryCount]) -> Self {
        let mut hasher = DefaultHasher::new();
        for row in rows {
            row.name.hash(&mut hasher);
            row.count.hash(&mut hasher);
        }
        Self {
            kind: ChartKind::CategoryPie,
            data_hash: hasher.finish(),
        }
    }

    fn keywords(rows: &[KeywordCount]) -> Self {
        let mut hasher = DefaultHasher::new();
        for row in rows {
            row.word.hash(&mut hasher);
            row.count.hash(&mut hasher);
        }
        Self {
            kind: ChartKind::KeywordBars,
            data_hash: hasher.finish(),
        }
    }

    fn hourly(rows: &[HourlyCount]) -> Self {
        let mut hasher = DefaultHasher::new();
        for row in rows {
            row.hour.hash(&mut hasher);
            row.count.hash(&mut hasher);
        }
        Self {
            kind: ChartKind::HourlySpike,
            data_hash: hasher.finish(),
        }
    }
}

// Helper function to wrap errors
fn wrap_err<E>(e: E) -> PlotError
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    e.into()
}

async fn cached(key: &PlotCacheKey) -> Option<Vec<u8>> {
    let mut cache = PLOT_CACHE.lock().await;
    if let Some((png, rendered_at)) = cache.get(key) {
        if rendered_at.elapsed() < CACHE_TTL {
            return Some(png.clone());
        }
    }
    None
}

async fn store(key: PlotCacheKey, png: Vec<u8>) {
    PLOT_CACHE.lock().await.put(key, (png, Instant::now()));
}

/// Render the category pie chart to PNG bytes.
pub async fn category_pie_png(rows: Vec<CategoryCount>) -> Result<Vec<u8>, PlotError> {
    let key = PlotCacheKey::category(&rows);
    if let Some(png) = cached(&key).await {
        return Ok(png);
    }
    let png = tokio::task::spawn_blocking(move || render_category_pie(&rows)).await??;
    store(key, png.clone()).await;
    Ok(png)
}

/// Render the keyword bar chart to PNG bytes.
pub async fn keyword_bars_png(rows: Vec<KeywordCount>) -> Result<Vec<u8>, PlotError> {
    let key = PlotCacheKey::keywords(&rows);
    if let Some(png) = cached(&key).await {
        return Ok(png);
    }
    let png = tokio::task::spawn_blocking(move || render_keyword_bars(&rows)).await??;
    store(key, png.clone()).await;
    Ok(png)
}

/// Render the hourly time-spike chart to PNG bytes.
pub async fn hourly_spike_png(rows: Vec<HourlyCount>) -> Result<Vec<u8>, PlotError> {
    let key = PlotCacheKey::hourly(&rows);
    if let Some(png) = cached(&key).await {
        return Ok(png);
    }
    let png = tokio::task::spawn_blocking(move || render_hourly_spike(&rows)).await??;
    store(key, png.clone()).await;
    Ok(png)
}

/// Rasterize an RGB buffer rendered by plotters into PNG bytes.
fn encode_png(width: u32, height: u32, buffer: Vec<u8>) -> Result<Vec<u8>, PlotError> {
    let img = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| wrap_err("rendered buffer has unexpected size"))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(wrap_err)?;
    Ok(png)
}

fn render_category_pie(rows: &[CategoryCount]) -> Result<Vec<u8>, PlotError> {
    let (width, height) = PIE_SIZE;
    let theme = ChartTheme::default();
    let style = ChartStyle::default();
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&theme.background_color).map_err(wrap_err)?;

        if rows.is_empty() {
            draw_empty_note(&root, &theme, &style, "No reports yet")?;
        } else {
            let center = ((width / 2) as i32, (height / 2) as i32);
            let radius = (width.min(height) as f64) * 0.4;
            let sizes: Vec<f64> = rows.iter().map(|row| row.count as f64).collect();
            let colors: Vec<RGBColor> =
                rows.iter().map(|row| color_for_category(&row.name)).collect();
            let labels: Vec<String> = rows
                .iter()
                .map(|row| format!("{} {:.0}%", row.name, row.percentage))
                .collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.label_style(("sans-serif", style.font_size).into_font().color(&theme.text_color));
            root.draw(&pie).map_err(wrap_err)?;
        }
        root.present().map_err(wrap_err)?;
    }
    encode_png(width, height, buffer)
}

fn render_keyword_bars(rows: &[KeywordCount]) -> Result<Vec<u8>, PlotError> {
    let (width, height) = BAR_SIZE;
    let theme = ChartTheme::default();
    let style = ChartStyle::default();
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&theme.background_color).map_err(wrap_err)?;

        if rows.is_empty() {
            draw_empty_note(&root, &theme, &style, "No keywords yet")?;
        } else {
            let max = rows.iter().map(|row| row.count).max().unwrap_or(0).max(1);
            let mut chart = ChartBuilder::on(&root)
                .margin(style.margin)
                .x_label_area_size(style.label_area_size)
                .y_label_area_size(style.label_area_size * 2)
                .build_cartesian_2d(0f64..(max + 1) as f64, 0f64..rows.len() as f64)
                .map_err(wrap_err)?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(rows.len())
                .y_label_formatter(&|y| {
                    rows.get(y.floor() as usize)
                        .map(|row| row.word.clone())
                        .unwrap_or_default()
                })
                .label_style(
                    ("sans-serif", style.font_size)
                        .into_font()
                        .color(&theme.text_color),
                )
                .axis_style(theme.grid_color)
                .draw()
                .map_err(wrap_err)?;

            chart
                .draw_series(rows.iter().enumerate().map(|(i, row)| {
                    Rectangle::new(
                        [
                            (0.0, i as f64 + 0.15),
                            (row.count as f64, i as f64 + 0.85),
                        ],
                        KEYWORD_BAR_COLOR.filled(),
                    )
                }))
                .map_err(wrap_err)?;
        }
        root.present().map_err(wrap_err)?;
    }
    encode_png(width, height, buffer)
}

fn render_hourly_spike(rows: &[HourlyCount]) -> Result<Vec<u8>, PlotError> {
    let (width, height) = SPIKE_SIZE;
    let theme = ChartTheme::default();
    let style = ChartStyle::default();
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&theme.background_color).map_err(wrap_err)?;

        let max = rows.iter().map(|row| row.count).max().unwrap_or(0).max(1);
        let mut chart = ChartBuilder::on(&root)
            .margin(style.margin)
            .x_label_area_size(style.label_area_size)
            .y_label_area_size(style.label_area_size)
            .build_cartesian_2d(0u32..23u32, 0usize..max + 1)
            .map_err(wrap_err)?;

        chart
            .configure_mesh()
            .x_labels(12)
            .x_label_formatter(&|hour| format!("{hour:02}:00"))
            .label_style(
                ("sans-serif", style.font_size)
                    .into_font()
                    .color(&theme.text_color),
            )
            .axis_style(theme.grid_color)
            .draw()
            .map_err(wrap_err)?;

        let points: Vec<(u32, usize)> = rows.iter().map(|row| (row.hour, row.count)).collect();
        chart
            .draw_series(AreaSeries::new(points.clone(), 0, SPIKE_COLOR.mix(0.3)))
            .map_err(wrap_err)?;
        chart
            .draw_series(LineSeries::new(points, SPIKE_COLOR.stroke_width(3)))
            .map_err(wrap_err)?;
        root.present().map_err(wrap_err)?;
    }
    encode_png(width, height, buffer)
}

fn draw_empty_note(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    theme: &ChartTheme,
    style: &ChartStyle,
    note: &str,
) -> Result<(), PlotError> {
    let (width, height) = root.dim_in_pixel();
    root.draw(&Text::new(
        note.to_string(),
        ((width / 3) as i32, (height / 2) as i32),
        ("sans-serif", style.font_size)
            .into_font()
            .color(&theme.text_color),
    ))
    .map_err(wrap_err)?;
    Ok(())
}
