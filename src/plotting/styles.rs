use plotters::style::RGBColor;

/// Chart theme configuration. The dashboard renders on light panels.
pub struct ChartTheme {
    pub background_color: RGBColor,
    pub text_color: RGBColor,
    pub grid_color: RGBColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: RGBColor(255, 255, 255),
            text_color: RGBColor(33, 33, 33),
            grid_color: RGBColor(210, 210, 210),
        }
    }
}

/// Chart style configuration.
pub struct ChartStyle {
    pub font_size: u32,
    pub margin: u32,
    pub label_area_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_size: 15,
            margin: 10,
            label_area_size: 40,
        }
    }
}

/// Fill for the keyword bar chart.
pub const KEYWORD_BAR_COLOR: RGBColor = RGBColor(211, 47, 47);

/// Line/area color for the hourly spike chart.
pub const SPIKE_COLOR: RGBColor = RGBColor(233, 30, 99);

/// Pie slice color for a category name. The well-known event categories
/// keep their fixed colors; anything else falls back to grey.
pub fn color_for_category(name: &str) -> RGBColor {
    match name.to_lowercase().as_str() {
        "trash" => RGBColor(67, 160, 71),
        "crowd" => RGBColor(229, 57, 53),
        "queue" => RGBColor(30, 136, 229),
        _ => RGBColor(120, 120, 120),
    }
}
