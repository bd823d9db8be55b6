//! SurrealDB implementation of [`MemoryStore`].
//!
//! Document-collection adapter: records live in a `memories` table, the
//! owner filter runs in the query, and similarity scoring happens
//! in-process through the shared ranking helper.

use crate::ai::embedding::cosine_similarity;
use crate::domain::{MemoryRecord, NewMemoryRecord, SearchResult};
use crate::persistence::{MemoryStore, rank};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use uuid::Uuid;

#[derive(Debug)]
pub struct SurrealStore {
    db: Surreal<Any>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MemoryRow {
    record_id: String,
    owner_id: String,
    image_url: String,
    summary: String,
    tags: Vec<String>,
    embedding: Vec<f32>,
    created_at: DateTime<Utc>,
}

impl SurrealStore {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let db = connect(connection_string).await?;
        db.use_ns("recall").use_db("recall").await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl MemoryStore for SurrealStore {
    async fn save(&self, record: NewMemoryRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let row = MemoryRow {
            record_id: id.clone(),
            owner_id: record.owner_id,
            image_url: record.image_url,
            summary: record.summary,
            tags: record.tags,
            embedding: record.embedding,
            created_at: Utc::now(),
        };

        let _: Option<MemoryRow> = self.db.create(("memories", id.as_str())).content(row).await?;
        Ok(id)
    }

    async fn search(
        &self,
        owner_id: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let mut response = self
            .db
            .query("SELECT * FROM memories WHERE owner_id = $owner")
            .bind(("owner", owner_id.to_string()))
            .await?;
        let rows: Vec<MemoryRow> = response.take(0)?;

        let scored = rows
            .into_iter()
            .map(|row| {
                let similarity = cosine_similarity(&row.embedding, query_vec);
                let record = MemoryRecord {
                    id: row.record_id,
                    owner_id: row.owner_id,
                    image_url: row.image_url,
                    summary: row.summary,
                    tags: row.tags,
                    embedding: vec![],
                    created_at: row.created_at,
                };
                (record, similarity)
            })
            .collect();

        Ok(rank(scored, limit))
    }
}
