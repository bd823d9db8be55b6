//! Fake collaborators for integration tests: in-memory object store,
//! canned vision model, deterministic embedder, in-memory record store.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use recall::ai::embedding::cosine_similarity;
use recall::ai::vision::{VisionError, parse_analysis};
use recall::ai::{Embedder, VisionAnalyzer};
use recall::domain::{MemoryRecord, NewMemoryRecord, ScreenshotAnalysis, SearchResult};
use recall::persistence::{MemoryStore, rank};
use recall::storage::ObjectStore;
use std::sync::Mutex;
use uuid::Uuid;

/// Records every put and hands back a fake public URL.
#[derive(Debug, Default)]
pub struct FakeObjectStore {
    pub keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(&self, key: &str, _bytes: &[u8], _content_type: &str) -> Result<String> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("http://localhost:3001/media/screenshots/{key}"))
    }
}

/// Vision model that always answers with the same canned reply text; the
/// reply still goes through the real parse step.
#[derive(Debug)]
pub struct CannedVision {
    pub reply: String,
}

impl CannedVision {
    pub fn json() -> Self {
        Self {
            reply: r#"{"summary": "A mostly blank white page.", "tags": ["blank", "white", "empty", "page", "minimal"], "category": "UI Design"}"#
                .to_string(),
        }
    }

    pub fn prose() -> Self {
        Self {
            reply: "I see a screenshot but cannot describe it as JSON, sorry.".to_string(),
        }
    }
}

#[async_trait]
impl VisionAnalyzer for CannedVision {
    async fn analyze(&self, _image: &[u8], _mime: &str) -> Result<ScreenshotAnalysis, VisionError> {
        parse_analysis(&self.reply)
    }
}

/// Deterministic embedder: the same text always maps to the same
/// fixed-dimension unit vector.
#[derive(Debug)]
pub struct FakeEmbedder {
    pub dimension: usize,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let seed: u32 = text.bytes().map(u32::from).sum();
        let mut v: Vec<f32> = (0..self.dimension)
            .map(|i| (((seed as f32) + i as f32 * 0.37).sin()))
            .collect();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Append-only in-memory store scoring with the shared ranking helper.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub records: Mutex<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    /// Seed a record directly, bypassing the pipeline.
    pub fn seed(&self, owner_id: &str, id: &str, embedding: Vec<f32>) {
        self.records.lock().unwrap().push(MemoryRecord {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            image_url: format!("http://localhost:3001/media/screenshots/{id}.png"),
            summary: format!("seeded record {id}"),
            tags: vec!["seed".to_string()],
            embedding,
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn save(&self, record: NewMemoryRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.records.lock().unwrap().push(MemoryRecord {
            id: id.clone(),
            owner_id: record.owner_id,
            image_url: record.image_url,
            summary: record.summary,
            tags: record.tags,
            embedding: record.embedding,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn search(
        &self,
        owner_id: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let scored = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| (r.clone(), cosine_similarity(&r.embedding, query_vec)))
            .collect();
        Ok(rank(scored, limit))
    }
}

/// Store whose writes always fail; nothing ever becomes searchable.
#[derive(Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl MemoryStore for FailingStore {
    async fn save(&self, _record: NewMemoryRecord) -> Result<String> {
        Err(anyhow!("datastore write refused"))
    }

    async fn search(
        &self,
        _owner_id: &str,
        _query_vec: &[f32],
        _limit: usize,
    ) -> Result<Vec<SearchResult>> {
        Ok(vec![])
    }
}
