use egui::{Align2, Color32, ComboBox, Context, FontId, RichText, Sense, TextureHandle};
use std::sync::{Arc, Mutex};

use crate::backend::DocumentBackend;
use crate::store::ReportFilter;
use crate::types::TagIntensity;

use super::state::{App, ChartImages};

const PAGES: [&str; 3] = ["Main", "Report History", "Gallery"];
const HEATMAP_CELL: egui::Vec2 = egui::Vec2::new(84.0, 48.0);

/// Draw the main application UI
pub fn draw_ui(
    app: &mut App,
    ctx: &Context,
    app_arc: Arc<Mutex<App>>,
    backend: Arc<dyn DocumentBackend>,
) {
    egui::SidePanel::left("side_panel").show(ctx, |ui| {
        ui.heading("FD Reports");
        ui.separator();

        for page in PAGES {
            if ui
                .selectable_label(app.selected_page == page, page)
                .clicked()
            {
                app.selected_page = page.to_string();
            }
        }

        ui.separator();
        ui.label("Booth tracker category:");
        let categories = app.heatmap_categories();
        let mut selected = app.selected_heatmap_category.clone();
        ComboBox::new("heatmap_category", "")
            .selected_text(&selected)
            .show_ui(ui, |ui| {
                for name in &categories {
                    ui.selectable_value(&mut selected, name.clone(), name);
                }
            });
        app.set_heatmap_category(selected);

        ui.separator();
        ui.label("Spike chart date:");
        ui.horizontal(|ui| {
            if ui.button("<").clicked() {
                app.shift_selected_date(-1);
            }
            if ui.button(">").clicked() {
                app.shift_selected_date(1);
            }
            if ui.button("Today").clicked() {
                app.set_selected_date(None);
            }
        });
        ui.label(app.selected_date_label());

        if let Some(error) = &app.error_message {
            ui.separator();
            ui.colored_label(Color32::RED, error);
        }
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading(&app.selected_page);
        ui.separator();

        let page = app.selected_page.clone();
        egui::ScrollArea::vertical().show(ui, |ui| match page.as_str() {
            "Report History" => draw_history(app, ui, &backend),
            "Gallery" => draw_gallery(app, ui),
            _ => draw_dashboard(app, ui),
        });
    });

    // Re-render charts off the UI thread whenever the derived data moved.
    if app.update_needed && !app.is_rendering {
        app.update_needed = false;
        app.is_rendering = true;

        let category_data = app.category_data.clone();
        let keyword_data = app.keyword_data.clone();
        let hourly_data = app.hourly_data.clone();
        let app_clone = app_arc.clone();

        tokio::spawn(async move {
            let pie = crate::plotting::category_pie_png(category_data).await;
            let bars = crate::plotting::keyword_bars_png(keyword_data).await;
            let spike = crate::plotting::hourly_spike_png(hourly_data).await;

            match (pie, bars, spike) {
                (Ok(pie), Ok(bars), Ok(spike)) => {
                    if let Ok(mut app) = app_clone.lock() {
                        app.chart_images = Some(ChartImages { pie, bars, spike });
                        app.textures_stale = true;
                        app.is_rendering = false;
                        if let Some(ctx) = &app.egui_ctx {
                            ctx.request_repaint();
                        }
                    }
                }
                (pie, bars, spike) => {
                    for err in [pie.err(), bars.err(), spike.err()].into_iter().flatten() {
                        eprintln!("Plotting error: {err}");
                    }
                    if let Ok(mut app) = app_clone.lock() {
                        app.is_rendering = false;
                    }
                }
            }
        });
    }

    if app.textures_stale {
        if let Some(images) = app.chart_images.take() {
            app.pie_texture = load_texture_from_png(ctx, "category_pie", &images.pie);
            app.keyword_texture = load_texture_from_png(ctx, "keyword_bars", &images.bars);
            app.spike_texture = load_texture_from_png(ctx, "hourly_spike", &images.spike);
        }
        app.textures_stale = false;
    }
}

fn draw_dashboard(app: &App, ui: &mut egui::Ui) {
    let snap = app.store.snapshot();
    ui.label(format!(
        "{} reports, {} categories, {} booths",
        snap.reports.len(),
        snap.categories.len(),
        snap.booths.len()
    ));
    ui.separator();

    ui.label(RichText::new("Reports by Category").strong());
    if let Some(texture) = &app.pie_texture {
        ui.image(texture);
    }
    for row in &app.category_data {
        ui.label(format!(
            "{:.0}%  {} ({} reports)",
            row.percentage, row.name, row.count
        ));
    }

    ui.separator();
    ui.label(RichText::new("Top Keywords").strong());
    if let Some(texture) = &app.keyword_texture {
        ui.image(texture);
    }

    ui.separator();
    ui.label(RichText::new("Report Time Spike").strong());
    ui.label(app.selected_date_label());
    if let Some(texture) = &app.spike_texture {
        ui.image(texture);
    }
    if app.hourly_data.iter().all(|row| row.count == 0) {
        ui.label("No reports for this date");
    }

    ui.separator();
    ui.label(RichText::new("Booth Tracker").strong());
    draw_heatmap(app, ui);
}

fn draw_heatmap(app: &App, ui: &mut egui::Ui) {
    for (initial, pairs) in app.grouped_heatmap() {
        ui.label(RichText::new(initial).strong());
        ui.horizontal_wrapped(|ui| {
            for pair in pairs {
                for cell in pair {
                    heatmap_cell(app, ui, &cell);
                }
                ui.add_space(16.0);
            }
        });
    }
}

fn heatmap_cell(app: &App, ui: &mut egui::Ui, cell: &TagIntensity) {
    let alpha = (cell.level * 255.0).round().clamp(0.0, 255.0) as u8;
    let fill = Color32::from_rgba_unmultiplied(229, 57, 53, alpha);

    let (rect, response) = ui.allocate_exact_size(HEATMAP_CELL, Sense::hover());
    ui.painter().rect_filled(rect, 6.0, fill);
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        &cell.tag,
        FontId::proportional(14.0),
        Color32::BLACK,
    );
    response.on_hover_text(format!(
        "{}: {} reports",
        app.booth_display_name(&cell.tag),
        cell.count
    ));
}

fn draw_history(app: &mut App, ui: &mut egui::Ui, backend: &Arc<dyn DocumentBackend>) {
    let snap = app.store.snapshot();
    if snap.reports.is_empty() {
        ui.label("No reports yet.");
        return;
    }

    for (index, report) in snap.reports.iter().enumerate() {
        ui.group(|ui| {
            ui.label(
                RichText::new(format!(
                    "#{} {}",
                    index + 1,
                    app.category_display_name(&report.category_id)
                ))
                .strong(),
            );
            ui.label(report.report_time.to_rfc3339());
            ui.label(app.location_details(&report.location_id));
            ui.label(app.volunteer_display_name(&report.volunteer_id));
            ui.label(&report.description);
            if let Some(url) = &report.image_url {
                ui.label(RichText::new(url).small());
            }
            if let Some(id) = &report.id {
                if ui.button("Delete").clicked() {
                    super::listeners::delete_report(Arc::clone(backend), id.clone());
                }
            }
        });
    }
}

fn draw_gallery(app: &mut App, ui: &mut egui::Ui) {
    let snap = app.store.snapshot();

    let selected_label = match &app.gallery_category {
        Some(id) => app.category_display_name(id),
        None => "All".to_string(),
    };
    ComboBox::new("gallery_category", "")
        .selected_text(selected_label)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut app.gallery_category, None, "All");
            for category in &snap.categories {
                ui.selectable_value(
                    &mut app.gallery_category,
                    Some(category.id.clone()),
                    &category.name,
                );
            }
        });

    let filter = ReportFilter {
        category_id: app.gallery_category.clone(),
        with_image: true,
    };
    let reports = snap.filtered_reports(&filter);
    if reports.is_empty() {
        ui.label("No pictures for this category.");
        return;
    }

    for report in &reports {
        if let Some(url) = &report.image_url {
            ui.group(|ui| {
                ui.label(app.category_display_name(&report.category_id));
                ui.hyperlink(url);
            });
        }
    }
}

fn load_texture_from_png(ctx: &Context, name: &str, bytes: &[u8]) -> Option<TextureHandle> {
    match image::load_from_memory(bytes) {
        Ok(img) => {
            let size = [img.width() as usize, img.height() as usize];
            let pixels = img.to_rgba8();
            let pixels = pixels.as_flat_samples();
            Some(ctx.load_texture(
                name,
                egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()),
                egui::TextureOptions::LINEAR,
            ))
        }
        Err(err) => {
            eprintln!("Failed to load plot image: {err}");
            None
        }
    }
}
