pub mod grouping;

pub use grouping::{group_by_initial, pair_tags, sorted_unique_tags};
