//! Booth occupancy intensity for the heatmap: per-tag report counts for a
//! selected category, converted to discrete opacity levels through a
//! configurable threshold scale.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Report, TagIntensity};

/// One step of the intensity scale: every count >= `min_count` (up to the
/// next step) maps to `level`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntensityStep {
    pub min_count: usize,
    pub level: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("intensity scale must have at least one step")]
    Empty,
    #[error("intensity scale must start at count 0")]
    MissingZeroStep,
    #[error("intensity scale counts must be strictly increasing")]
    UnorderedCounts,
    #[error("intensity scale levels must be non-decreasing")]
    DecreasingLevels,
    #[error("intensity levels must lie in [0, 1]")]
    LevelOutOfRange,
}

/// Ordered count-to-level threshold table. Construction validates that the
/// table is monotonic, so a higher count can never render fainter than a
/// lower one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<IntensityStep>", into = "Vec<IntensityStep>")]
pub struct IntensityScale {
    steps: Vec<IntensityStep>,
}

impl IntensityScale {
    pub fn new(steps: Vec<IntensityStep>) -> Result<Self, ScaleError> {
        let Some(first) = steps.first() else {
            return Err(ScaleError::Empty);
        };
        if first.min_count != 0 {
            return Err(ScaleError::MissingZeroStep);
        }
        for pair in steps.windows(2) {
            if pair[1].min_count <= pair[0].min_count {
                return Err(ScaleError::UnorderedCounts);
            }
            if pair[1].level < pair[0].level {
                return Err(ScaleError::DecreasingLevels);
            }
        }
        if steps.iter().any(|step| !(0.0..=1.0).contains(&step.level)) {
            return Err(ScaleError::LevelOutOfRange);
        }
        Ok(Self { steps })
    }

    /// The level of the last step whose `min_count` does not exceed `count`.
    pub fn level_for(&self, count: usize) -> f64 {
        self.steps
            .iter()
            .take_while(|step| step.min_count <= count)
            .last()
            .map(|step| step.level)
            .unwrap_or(0.0)
    }

    /// Level of a booth with no reports.
    pub fn minimum_level(&self) -> f64 {
        self.steps.first().map(|step| step.level).unwrap_or(0.0)
    }

    pub fn steps(&self) -> &[IntensityStep] {
        &self.steps
    }
}

/// The shipped scale: 0 -> 0.10, 1-8 -> 0.30, 9-14 -> 0.60, 15-20 -> 0.80,
/// 21+ -> 1.00.
impl Default for IntensityScale {
    fn default() -> Self {
        Self {
            steps: vec![
                IntensityStep { min_count: 0, level: 0.1 },
                IntensityStep { min_count: 1, level: 0.3 },
                IntensityStep { min_count: 9, level: 0.6 },
                IntensityStep { min_count: 15, level: 0.8 },
                IntensityStep { min_count: 21, level: 1.0 },
            ],
        }
    }
}

impl TryFrom<Vec<IntensityStep>> for IntensityScale {
    type Error = ScaleError;

    fn try_from(steps: Vec<IntensityStep>) -> Result<Self, Self::Error> {
        Self::new(steps)
    }
}

impl From<IntensityScale> for Vec<IntensityStep> {
    fn from(scale: IntensityScale) -> Self {
        scale.steps
    }
}

/// Count the selected category's reports per booth tag.
///
/// The category is selected by (lowercased) name and resolved through
/// `category_ids`; an unresolved name yields an empty map with a logged
/// warning rather than an error. Reports whose `location_id` has no known
/// tag are excluded from the counts and logged.
pub fn category_report_counts(
    reports: &[Report],
    selected_category: &str,
    category_ids: &HashMap<String, String>,
    booth_tags: &HashMap<String, String>,
) -> HashMap<String, usize> {
    let Some(category_id) = category_ids.get(selected_category) else {
        tracing::warn!(category = selected_category, "no category id for selection");
        return HashMap::new();
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for report in reports {
        if &report.category_id != category_id {
            continue;
        }
        match booth_tags.get(&report.location_id) {
            Some(tag) => *counts.entry(tag.clone()).or_insert(0) += 1,
            None => {
                tracing::warn!(location_id = %report.location_id, "no tag for report location");
            }
        }
    }
    counts
}

/// Pair every known booth tag with its count and intensity level. Tags are
/// emitted sorted, and tags absent from `counts` carry the scale's minimum
/// level, so the heatmap grid is always fully populated.
pub fn tag_intensities(
    booth_tags: &HashMap<String, String>,
    counts: &HashMap<String, usize>,
    scale: &IntensityScale,
) -> Vec<TagIntensity> {
    let tags: BTreeSet<&String> = booth_tags.values().collect();
    tags.into_iter()
        .map(|tag| {
            let count = counts.get(tag).copied().unwrap_or(0);
            TagIntensity {
                tag: tag.clone(),
                count,
                level: scale.level_for(count),
            }
        })
        .collect()
}
