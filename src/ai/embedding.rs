//! Text embeddings for indexing and querying.
//!
//! One `Arc<dyn Embedder>` is built at startup and shared by the capture
//! (write) and search (read) paths. Both sides going through the same
//! handle is what keeps the stored and query vectors in the same model
//! and dimensionality; a mismatch silently degrades similarity search,
//! so `server::start_server` also refuses to boot when the embedder's
//! dimension disagrees with the persistence config.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Dimensionality of the local fastembed model (BGE-Small-En-V1.5).
pub const LOCAL_EMBEDDING_DIMENSION: usize = 384;

/// Default dimensionality requested from remote embedding providers.
pub const DEFAULT_REMOTE_DIMENSION: usize = 768;

/// Converts text into a fixed-dimension vector.
///
/// No caching: every call is a fresh request against the configured model.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The fixed output dimensionality of this embedder.
    fn dimension(&self) -> usize;
}

/// Remote embedder against an OpenAI-compatible `/v1/embeddings` endpoint.
///
/// The output dimensionality is pinned explicitly via the `dimensions`
/// request parameter and validated on every response.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
            "dimensions": self.dimension,
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp: EmbeddingsResponse = rb
            .send()
            .await
            .context("embedding request failed")?
            .error_for_status()?
            .json()
            .await
            .context("decoding embedding response")?;

        let vector = resp
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| anyhow!("embedding provider returned no vectors"))?;

        if vector.len() != self.dimension {
            return Err(anyhow!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            ));
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Local embedder backed by fastembed (BGE-Small-En-V1.5, 384 dims).
///
/// fastembed's `embed` is blocking, so the model is taken out of the
/// mutex, run on the blocking pool, and put back.
pub struct LocalEmbedder {
    model: Arc<Mutex<Option<TextEmbedding>>>,
}

impl std::fmt::Debug for LocalEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbedder")
            .field("model", &"BGESmallENV15")
            .field("dimension", &LOCAL_EMBEDDING_DIMENSION)
            .finish()
    }
}

impl LocalEmbedder {
    pub fn new() -> Result<Self> {
        tracing::info!("Initializing fastembed model (BGE-Small-En-V1.5)...");
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::BGESmallENV15))?;
        Ok(Self {
            model: Arc::new(Mutex::new(Some(model))),
        })
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut model_guard = self.model.lock().await;
        let mut owned_model = model_guard
            .take()
            .context("embedding model unexpectedly absent")?;

        let input = vec![text.to_string()];
        let (result, returned_model) = tokio::task::spawn_blocking(move || {
            let res = owned_model.embed(input, None);
            (res, owned_model)
        })
        .await?;

        *model_guard = Some(returned_model);

        let mut vectors = result.map_err(|e| anyhow!(e))?;
        vectors
            .pop()
            .ok_or_else(|| anyhow!("fastembed returned no vectors"))
    }

    fn dimension(&self) -> usize {
        LOCAL_EMBEDDING_DIMENSION
    }
}

/// Cosine similarity between two vectors of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
