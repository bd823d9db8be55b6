//! External model integrations: vision analysis and text embeddings.

pub mod embedding;
pub mod vision;

pub use embedding::{Embedder, LocalEmbedder, RemoteEmbedder};
pub use vision::{VisionAnalyzer, VisionClient, VisionError};

use std::time::Duration;

/// Shared reqwest client for model providers.
///
/// Carries a bounded request timeout so a hung upstream call fails the
/// capture through the normal error channel instead of wedging it.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
