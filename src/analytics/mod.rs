//! # Analytics
//!
//! The aggregation core of the dashboard. Every component here is a pure,
//! synchronous function over one snapshot: derived rows are recomputed in
//! full on each ingest and live for one render cycle. Reports with foreign
//! keys that do not resolve degrade to "show less data", never to an error.

pub mod category;
pub mod heatmap;
pub mod hourly;
pub mod keywords;

pub use category::category_breakdown;
pub use heatmap::{category_report_counts, tag_intensities, IntensityScale, IntensityStep};
pub use hourly::hourly_counts;
pub use keywords::top_keywords;
