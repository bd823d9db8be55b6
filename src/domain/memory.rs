use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured output of the vision analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenshotAnalysis {
    /// 1-2 sentence summary of the screenshot.
    pub summary: String,
    /// 5-15 short tags describing the content.
    pub tags: Vec<String>,
    /// Optional category label (e.g. "Web Development", "Documentation").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A record handed to the persistence layer for insertion.
///
/// `id` and `created_at` are assigned by the store at persistence time.
#[derive(Debug, Clone)]
pub struct NewMemoryRecord {
    pub owner_id: String,
    pub image_url: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub embedding: Vec<f32>,
}

/// One captured-and-analyzed screenshot, as persisted.
///
/// Records are append-only: created exactly once after a successful
/// capture, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    pub id: String,
    pub owner_id: String,
    pub image_url: String,
    pub summary: String,
    pub tags: Vec<String>,
    #[serde(skip)]
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Transient projection returned by a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub record: MemoryRecord,
    pub similarity: f32,
}
