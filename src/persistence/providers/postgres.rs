//! Postgres + pgvector implementation of [`MemoryStore`].
//!
//! Filtering, the similarity floor, ordering, and the limit all happen
//! SQL-side; cosine similarity is `1 - (embedding <=> query)`.

use crate::domain::{MemoryRecord, NewMemoryRecord, SearchResult};
use crate::persistence::{MemoryStore, SIMILARITY_FLOOR};
use anyhow::Result;
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        // Run Migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl MemoryStore for PostgresStore {
    async fn save(&self, record: NewMemoryRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let embedding_vector = Vector::from(record.embedding);

        // Append-only: plain INSERT, no upsert. Records are immutable.
        sqlx::query(
            r#"
            INSERT INTO memories (id, owner_id, image_url, summary, tags, embedding, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(&id)
        .bind(&record.owner_id)
        .bind(&record.image_url)
        .bind(&record.summary)
        .bind(&record.tags)
        .bind(embedding_vector)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn search(
        &self,
        owner_id: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let embedding_vector = Vector::from(query_vec.to_vec());
        let limit_i64 = limit as i64;
        let floor_f64 = f64::from(SIMILARITY_FLOOR);

        // Owner scoping is strict: only this owner's rows are candidates.
        // Ties on similarity break toward the newer record.
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, image_url, summary, tags, created_at,
                   1 - (embedding <=> $2) AS similarity
            FROM memories
            WHERE owner_id = $1
              AND 1 - (embedding <=> $2) >= $3
            ORDER BY similarity DESC, created_at DESC
            LIMIT $4
            "#,
        )
        .bind(owner_id) // $1
        .bind(embedding_vector) // $2
        .bind(floor_f64) // $3
        .bind(limit_i64) // $4
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::new();
        for row in rows {
            let id: String = row.try_get("id")?;
            let owner_id: String = row.try_get("owner_id")?;
            let image_url: String = row.try_get("image_url")?;
            let summary: String = row.try_get("summary")?;
            let tags: Vec<String> = row.try_get("tags")?;
            let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at")?;
            let similarity: f64 = row.try_get("similarity")?;

            let record = MemoryRecord {
                id,
                owner_id,
                image_url,
                summary,
                tags,
                embedding: vec![],
                created_at,
            };

            results.push(SearchResult {
                record,
                similarity: similarity as f32,
            });
        }
        Ok(results)
    }
}
