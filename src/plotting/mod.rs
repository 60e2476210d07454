//! Off-screen chart generation for the dashboard panels. Charts are
//! rendered with plotters into RGB buffers, encoded as PNG and handed to
//! the UI as textures; identical data hits an in-process cache.

pub mod chart;
pub mod styles;

#[cfg(test)]
mod tests;

pub use chart::{category_pie_png, hourly_spike_png, keyword_bars_png, PlotError};
