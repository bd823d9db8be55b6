//! The capture -> analyze -> embed -> store pipeline, and its query twin.
//!
//! One `CapturePipeline` is built at startup with process-wide resource
//! handles and shared across all requests. Stages run strictly in order
//! for a single capture; independent captures interleave freely on the
//! runtime.

use crate::ai::vision::VisionError;
use crate::ai::{Embedder, VisionAnalyzer};
use crate::domain::{NewMemoryRecord, ScreenshotAnalysis, SearchResult};
use crate::persistence::MemoryStore;
use crate::storage::{ObjectStore, screenshot_key};
use serde::Serialize;
use std::sync::Arc;

/// One consolidated failure per capture or search attempt.
///
/// The caller gets a single human-readable reason; the root cause is
/// logged server-side where the stage failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to store screenshot: {0}")]
    Storage(#[source] anyhow::Error),
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),
    #[error("failed to persist memory: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// Successful outcome of one processed capture.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutcome {
    pub image_url: String,
    pub analysis: ScreenshotAnalysis,
}

#[derive(Debug)]
pub struct CapturePipeline {
    objects: Arc<dyn ObjectStore>,
    vision: Arc<dyn VisionAnalyzer>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn MemoryStore>,
}

impl CapturePipeline {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        vision: Arc<dyn VisionAnalyzer>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn MemoryStore>,
    ) -> Self {
        Self {
            objects,
            vision,
            embedder,
            store,
        }
    }

    /// Process one capture end to end.
    ///
    /// The record only becomes visible to search once the final `save`
    /// succeeds. If persistence fails after the image upload, the stored
    /// image is an orphan but is never linked to a searchable record.
    pub async fn process(
        &self,
        owner_id: &str,
        image: Vec<u8>,
        mime: &str,
    ) -> Result<CaptureOutcome, PipelineError> {
        let key = screenshot_key(owner_id);

        let image_url = self
            .objects
            .put(&key, &image, mime)
            .await
            .map_err(PipelineError::Storage)?;

        let analysis = self.vision.analyze(&image, mime).await?;

        let embedding = self
            .embedder
            .embed(&embedding_text(&analysis))
            .await
            .map_err(PipelineError::Embedding)?;

        let id = self
            .store
            .save(NewMemoryRecord {
                owner_id: owner_id.to_string(),
                image_url: image_url.clone(),
                summary: analysis.summary.clone(),
                tags: analysis.tags.clone(),
                embedding,
            })
            .await
            .map_err(PipelineError::Persistence)?;

        tracing::info!(
            name: "capture.processed",
            id = %id,
            owner_id = %owner_id,
            tags = analysis.tags.len(),
            "Screenshot captured and indexed"
        );

        Ok(CaptureOutcome {
            image_url,
            analysis,
        })
    }

    /// Embed a free-text query through the same embedder as the write
    /// path and run an owner-scoped similarity search.
    pub async fn search(
        &self,
        owner_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, PipelineError> {
        let query_vec = self
            .embedder
            .embed(query)
            .await
            .map_err(PipelineError::Embedding)?;

        let results = self
            .store
            .search(owner_id, &query_vec, limit)
            .await
            .map_err(PipelineError::Persistence)?;

        tracing::debug!(
            name: "search.completed",
            owner_id = %owner_id,
            results = results.len(),
            "Similarity search completed"
        );

        Ok(results)
    }
}

/// The text that gets embedded for a record: summary plus tags.
pub fn embedding_text(analysis: &ScreenshotAnalysis) -> String {
    format!("{} {}", analysis.summary, analysis.tags.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_text_joins_summary_and_tags() {
        let analysis = ScreenshotAnalysis {
            summary: "A dashboard.".to_string(),
            tags: vec!["charts".to_string(), "metrics".to_string()],
            category: None,
        };
        assert_eq!(embedding_text(&analysis), "A dashboard. charts metrics");
    }
}
