//! # Common Types
//!
//! This module contains the domain records streamed from the document backend
//! and the derived rows computed by the analytics components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::Document;

/// A single field report submitted by a volunteer.
///
/// `category_id` and `location_id` are foreign keys into the Categories and
/// Booths collections. Both may dangle, since the source data is externally
/// authored; the analytics components treat dangling references as unknown
/// and drop them from counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Backend document id. `None` until the report has been persisted.
    #[serde(skip)]
    pub id: Option<String>,
    #[serde(rename = "categoryID")]
    pub category_id: String,
    pub description: String,
    #[serde(rename = "locationID")]
    pub location_id: String,
    /// Submission instant, RFC 3339 on the wire.
    #[serde(rename = "reportTime")]
    pub report_time: DateTime<Utc>,
    #[serde(rename = "volunteerID")]
    pub volunteer_id: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A report category. Names are compared case-insensitively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip)]
    pub id: String,
    pub name: String,
}

/// A physical booth. The document id doubles as the report `location_id`;
/// `tag` is the short display code used as the heatmap cell key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booth {
    #[serde(skip)]
    pub id: String,
    pub hall: String,
    pub name: String,
    pub tag: String,
}

/// A dashboard user, consumed only to resolve volunteer names in the
/// report history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub role: String,
}

/// Per-category share of the resolved reports, for the pie chart.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
    /// Share of all reports with a resolvable category, in percent.
    /// Defined as 0 when no report resolves.
    pub percentage: f64,
}

/// One keyword and its frequency across all report descriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Report count for one hour of the selected day. The bucketizer always
/// emits hours 0 through 23, zero-filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourlyCount {
    pub hour: u32,
    pub count: usize,
}

/// Report count and heatmap cell opacity for one booth tag.
#[derive(Clone, Debug, PartialEq)]
pub struct TagIntensity {
    pub tag: String,
    pub count: usize,
    /// Normalized [0, 1] level driving the cell opacity.
    pub level: f64,
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, doc: &Document) -> Option<T> {
    match serde_json::from_value(Value::Object(doc.fields.clone())) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(id = %doc.id, %err, "skipping malformed {kind} document");
            None
        }
    }
}

impl Report {
    /// Decode a report from a backend document. Documents missing a required
    /// field (or carrying a malformed timestamp) are skipped with a warning,
    /// never an error.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let mut report: Report = decode("report", doc)?;
        report.id = Some(doc.id.clone());
        Some(report)
    }

    /// Wire representation of the report fields, for add/set operations.
    /// The document id is carried out of band.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        }
    }
}

impl Category {
    pub fn from_document(doc: &Document) -> Option<Self> {
        let mut category: Category = decode("category", doc)?;
        category.id = doc.id.clone();
        Some(category)
    }
}

impl Booth {
    pub fn from_document(doc: &Document) -> Option<Self> {
        let mut booth: Booth = decode("booth", doc)?;
        booth.id = doc.id.clone();
        Some(booth)
    }
}

impl User {
    pub fn from_document(doc: &Document) -> Option<Self> {
        let mut user: User = decode("user", doc)?;
        user.id = doc.id.clone();
        Some(user)
    }
}
