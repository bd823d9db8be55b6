//! Persistence and retrieval of memory records.
//!
//! The store is a pluggable interface: a SQL implementation (Postgres +
//! pgvector) and a document implementation (SurrealDB) both satisfy
//! [`MemoryStore`]; the pipeline never assumes which one it is talking to.

use crate::domain::{MemoryRecord, NewMemoryRecord, SearchResult};
use anyhow::Result;
use async_trait::async_trait;

pub mod providers;

/// Results below this similarity are excluded entirely, not returned
/// with a low score. Reference behavior; intentionally not configurable.
pub const SIMILARITY_FLOOR: f32 = 0.5;

/// Maximum results returned when the caller does not cap the search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Append-only store of memory records with owner-scoped vector search.
#[async_trait]
pub trait MemoryStore: Send + Sync + std::fmt::Debug {
    /// Insert one record and return its generated id.
    ///
    /// Never updates or merges: records are immutable once written, and
    /// `created_at` is assigned here, server-side.
    async fn save(&self, record: NewMemoryRecord) -> Result<String>;

    /// Nearest-neighbor search among records owned by `owner_id`.
    ///
    /// Returns at most `limit` results with `similarity >=`
    /// [`SIMILARITY_FLOOR`], ordered by descending similarity and, for
    /// equal similarity, by recency.
    async fn search(
        &self,
        owner_id: &str,
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;
}

/// Floor, order, tie-break, and cap a set of scored records.
///
/// Shared by stores that score in-process, so the ranking contract has a
/// single implementation.
pub fn rank(scored: Vec<(MemoryRecord, f32)>, limit: usize) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = scored
        .into_iter()
        .filter(|(_, similarity)| *similarity >= SIMILARITY_FLOOR)
        .map(|(record, similarity)| SearchResult { record, similarity })
        .collect();

    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.record.created_at.cmp(&a.record.created_at))
    });
    results.truncate(limit);
    results
}
