//! Recall - screenshot memory capture and retrieval.
//!
//! Captures a screenshot (tab capture or clipboard paste), has a
//! vision-capable model summarize and tag it, embeds the description into
//! a vector, and stores image + metadata + vector. Free-text queries are
//! embedded with the same model and answered by an owner-scoped
//! nearest-neighbor search.
//!
//! # Modules
//!
//! - [`capture`]: trigger dispatch across isolated surfaces (typed bus)
//! - [`ai`]: vision analysis and text embeddings
//! - [`persistence`]: pluggable memory store (Postgres/pgvector, SurrealDB)
//! - [`storage`]: durable screenshot blob storage
//! - [`pipeline`]: the capture -> analyze -> embed -> store pipeline
//! - [`api`] / [`server`]: HTTP surface

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::unused_async)]

pub mod ai;
pub mod api;
pub mod capture;
pub mod config;
pub mod domain;
pub mod persistence;
pub mod pipeline;
pub mod server;
pub mod storage;

use pipeline::CapturePipeline;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The capture/search pipeline with its process-wide resource handles.
    pub pipeline: Arc<CapturePipeline>,
}
