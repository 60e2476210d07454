//! Dashboard configuration: the heatmap intensity breakpoints, the clock
//! the hourly chart is bucketed against, and the keyword limit. Loaded
//! from a JSON file under the platform config directory when present.

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::heatmap::IntensityScale;
use crate::analytics::keywords::DEFAULT_KEYWORD_LIMIT;

/// Which clock "same calendar day" and "hour of day" are evaluated
/// against. Venue offsets outside +/-18h are clamped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeReference {
    /// The viewer's local clock.
    DeviceLocal,
    /// A fixed offset east of UTC, for pinning charts to the event venue.
    VenueOffset { minutes_east: i32 },
}

impl TimeReference {
    pub fn offset(&self) -> FixedOffset {
        match self {
            TimeReference::DeviceLocal => *Local::now().offset(),
            TimeReference::VenueOffset { minutes_east } => {
                let seconds = (*minutes_east).clamp(-18 * 60, 18 * 60) * 60;
                FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
            }
        }
    }
}

impl Default for TimeReference {
    fn default() -> Self {
        TimeReference::DeviceLocal
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub intensity: IntensityScale,
    pub time_reference: TimeReference,
    pub top_keywords: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            intensity: IntensityScale::default(),
            time_reference: TimeReference::default(),
            top_keywords: DEFAULT_KEYWORD_LIMIT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load the config at `path`, falling back to defaults when the file
    /// is absent. A present-but-invalid file is reported, not defaulted
    /// over.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/fdreports/config.json`, when the platform exposes one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fdreports").join("config.json"))
}
