//! Durable storage for captured screenshot binaries.
//!
//! The pipeline only needs a public URL back; which provider sits behind
//! the trait (local disk, S3-compatible bucket) is a deployment choice.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

/// Stores screenshot blobs and hands back a durable public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Write `bytes` under `key` and return the URL the image is served at.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;
}

/// Build a collision-resistant object key for one capture.
///
/// Owner + millisecond timestamp + random suffix, so concurrent captures
/// by the same owner never collide.
pub fn screenshot_key(owner_id: &str) -> String {
    format!(
        "{}_{}_{}.png",
        owner_id,
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4()
    )
}

/// Disk-backed object store, served by the HTTP server under `/media`.
#[derive(Debug)]
pub struct LocalDiskStore {
    media_dir: PathBuf,
    public_base_url: String,
}

impl LocalDiskStore {
    /// `public_base_url` is the externally reachable server origin,
    /// e.g. `http://localhost:3001`.
    pub fn new(media_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            media_dir: media_dir.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalDiskStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<String> {
        let dir = self.media_dir.join("screenshots");
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating media directory {}", dir.display()))?;

        let path = dir.join(key);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing screenshot {}", path.display()))?;

        let base = self.public_base_url.trim_end_matches('/');
        Ok(format!("{base}/media/screenshots/{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screenshot_keys_are_unique_per_call() {
        let a = screenshot_key("owner-1");
        let b = screenshot_key("owner-1");
        assert_ne!(a, b);
        assert!(a.starts_with("owner-1_"));
        assert!(a.ends_with(".png"));
    }

    #[tokio::test]
    async fn local_disk_store_writes_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDiskStore::new(dir.path(), "http://localhost:3001/");

        let url = store
            .put("u1_0_test.png", b"\x89PNG", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3001/media/screenshots/u1_0_test.png");
        let on_disk = std::fs::read(dir.path().join("screenshots/u1_0_test.png")).unwrap();
        assert_eq!(on_disk, b"\x89PNG");
    }
}
