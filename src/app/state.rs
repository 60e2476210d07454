use eframe::App as EApp;
use egui::TextureHandle;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate, Utc};

use crate::analytics::{
    category_breakdown, category_report_counts, hourly_counts, tag_intensities, top_keywords,
};
use crate::backend::DocumentBackend;
use crate::config::DashboardConfig;
use crate::store::ReportStore;
use crate::types::{Booth, Category, CategoryCount, HourlyCount, KeywordCount, Report, TagIntensity};
use crate::utils::{group_by_initial, pair_tags};

/// PNG bytes for the three chart panels, produced off the UI thread.
#[derive(Clone)]
pub struct ChartImages {
    pub pie: Vec<u8>,
    pub bars: Vec<u8>,
    pub spike: Vec<u8>,
}

/// Main application state
#[derive(Clone)]
pub struct App {
    pub store: ReportStore,
    pub config: DashboardConfig,
    pub volunteer_names: HashMap<String, String>,
    pub selected_page: String,
    pub selected_heatmap_category: String,
    /// `None` means "today" under the configured time reference.
    pub selected_date: Option<NaiveDate>,
    /// Gallery filter: categoryID, `None` = all categories.
    pub gallery_category: Option<String>,
    pub category_data: Vec<CategoryCount>,
    pub keyword_data: Vec<KeywordCount>,
    pub hourly_data: Vec<HourlyCount>,
    pub heatmap_data: Vec<TagIntensity>,
    pub chart_images: Option<ChartImages>,
    pub pie_texture: Option<TextureHandle>,
    pub keyword_texture: Option<TextureHandle>,
    pub spike_texture: Option<TextureHandle>,
    pub update_needed: bool,
    pub textures_stale: bool,
    pub is_rendering: bool,
    pub error_message: Option<String>,
    pub egui_ctx: Option<egui::Context>,
    latest_reports: Vec<Report>,
    latest_categories: Vec<Category>,
    latest_booths: Vec<Booth>,
}

impl App {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replace the reports collection and recompute every derived view.
    pub fn apply_reports(&mut self, reports: Vec<Report>) {
        self.latest_reports = reports;
        self.reingest();
    }

    pub fn apply_categories(&mut self, categories: Vec<Category>) {
        self.latest_categories = categories;
        self.reingest();
    }

    pub fn apply_booths(&mut self, booths: Vec<Booth>) {
        self.latest_booths = booths;
        self.reingest();
    }

    fn reingest(&mut self) {
        self.store.ingest(
            self.latest_reports.clone(),
            self.latest_categories.clone(),
            self.latest_booths.clone(),
        );
        self.recompute();
    }

    /// Recompute all four derived views from the current snapshot. Runs
    /// synchronously to completion; the chart textures are refreshed on
    /// the next frame.
    pub fn recompute(&mut self) {
        let snap = self.store.snapshot();

        self.category_data = category_breakdown(&snap.reports, &snap.category_names);

        let descriptions: Vec<&str> = snap
            .reports
            .iter()
            .map(|report| report.description.as_str())
            .collect();
        self.keyword_data = top_keywords(descriptions, self.config.top_keywords);

        self.hourly_data = hourly_counts(
            &snap.reports,
            self.selected_date,
            &self.config.time_reference,
        );

        let counts = category_report_counts(
            &snap.reports,
            &self.selected_heatmap_category,
            &snap.category_ids,
            &snap.booth_tags,
        );
        self.heatmap_data = tag_intensities(&snap.booth_tags, &counts, &self.config.intensity);

        self.update_needed = true;
        if let Some(ctx) = &self.egui_ctx {
            ctx.request_repaint();
        }
    }

    pub fn set_heatmap_category(&mut self, name: String) {
        if self.selected_heatmap_category != name {
            self.selected_heatmap_category = name;
            self.recompute();
        }
    }

    pub fn set_selected_date(&mut self, date: Option<NaiveDate>) {
        if self.selected_date != date {
            self.selected_date = date;
            self.recompute();
        }
    }

    /// Move the spike-chart date by whole days; starts from today when no
    /// date was picked yet.
    pub fn shift_selected_date(&mut self, days: i64) {
        let current = self.selected_date.unwrap_or_else(|| self.today());
        let shifted = if days >= 0 {
            current.checked_add_days(Days::new(days as u64))
        } else {
            current.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.set_selected_date(Some(date));
        }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.config.time_reference.offset())
            .date_naive()
    }

    pub fn selected_date_label(&self) -> String {
        match self.selected_date {
            Some(date) => date.format("%A, %-d %B %Y").to_string(),
            None => format!("Today ({})", self.today().format("%-d %B %Y")),
        }
    }

    /// Lowercased category names available for the heatmap picker.
    pub fn heatmap_categories(&self) -> Vec<String> {
        let snap = self.store.snapshot();
        let mut names: Vec<String> = snap.category_ids.keys().cloned().collect();
        names.sort();
        names
    }

    /// Heatmap cells grouped by uppercased tag initial and paired
    /// two-at-a-time, ready for the grid.
    pub fn grouped_heatmap(&self) -> Vec<(String, Vec<Vec<TagIntensity>>)> {
        let tags: Vec<String> = self
            .heatmap_data
            .iter()
            .map(|cell| cell.tag.clone())
            .collect();
        let by_tag: HashMap<&str, &TagIntensity> = self
            .heatmap_data
            .iter()
            .map(|cell| (cell.tag.as_str(), cell))
            .collect();

        group_by_initial(&tags)
            .into_iter()
            .map(|(initial, tags)| {
                let pairs = pair_tags(&tags)
                    .into_iter()
                    .map(|pair| {
                        pair.iter()
                            .filter_map(|tag| by_tag.get(tag.as_str()).map(|&cell| cell.clone()))
                            .collect()
                    })
                    .collect();
                (initial, pairs)
            })
            .collect()
    }

    pub fn booth_display_name(&self, tag: &str) -> String {
        self.store
            .snapshot()
            .booth_names
            .get(tag)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn category_display_name(&self, category_id: &str) -> String {
        self.store
            .snapshot()
            .category_names
            .get(category_id)
            .cloned()
            .unwrap_or_else(|| "Unknown Category".to_string())
    }

    pub fn volunteer_display_name(&self, volunteer_id: &str) -> String {
        self.volunteer_names
            .get(volunteer_id)
            .cloned()
            .unwrap_or_else(|| "Unknown Volunteer".to_string())
    }

    pub fn location_details(&self, location_id: &str) -> String {
        let snap = self.store.snapshot();
        match snap.booths.iter().find(|booth| booth.id == location_id) {
            Some(booth) => format!("Hall {}, {}, {}", booth.hall, booth.name, booth.tag),
            None => "Unknown Location".to_string(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self {
            store: ReportStore::new(),
            config: DashboardConfig::default(),
            volunteer_names: HashMap::new(),
            selected_page: "Main".to_string(),
            selected_heatmap_category: "trash".to_string(),
            selected_date: None,
            gallery_category: None,
            category_data: Vec::new(),
            keyword_data: Vec::new(),
            hourly_data: Vec::new(),
            heatmap_data: Vec::new(),
            chart_images: None,
            pie_texture: None,
            keyword_texture: None,
            spike_texture: None,
            update_needed: false,
            textures_stale: false,
            is_rendering: false,
            error_message: None,
            egui_ctx: None,
            latest_reports: Vec::new(),
            latest_categories: Vec::new(),
            latest_booths: Vec::new(),
        }
    }
}

/// Thread-safe wrapper around App for use with eframe
pub struct AppWrapper {
    pub app: Arc<Mutex<App>>,
    pub backend: Arc<dyn DocumentBackend>,
}

impl EApp for AppWrapper {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Ok(mut app) = self.app.lock() {
            if app.egui_ctx.is_none() {
                app.egui_ctx = Some(ctx.clone());
            }
            super::ui::draw_ui(
                &mut app,
                ctx,
                Arc::clone(&self.app),
                Arc::clone(&self.backend),
            );
        } else {
            eprintln!("Failed to acquire app lock in update");
        }
    }
}
