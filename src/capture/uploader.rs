//! The single upload routine all capture triggers funnel into.

use crate::pipeline::{CaptureOutcome, CapturePipeline, PipelineError};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The backend rejected or failed the capture; message is user-facing.
    #[error("{0}")]
    Server(String),
    #[error("could not connect to the recall backend")]
    Connection(#[source] reqwest::Error),
}

/// Uploads one normalized capture payload for an owner.
#[async_trait]
pub trait ScreenshotUploader: Send + Sync + std::fmt::Debug {
    async fn upload(
        &self,
        owner_id: &str,
        image: Vec<u8>,
        mime: &str,
    ) -> Result<CaptureOutcome, UploadError>;
}

/// In-process upload: the dispatcher feeds the pipeline directly.
#[async_trait]
impl ScreenshotUploader for CapturePipeline {
    async fn upload(
        &self,
        owner_id: &str,
        image: Vec<u8>,
        mime: &str,
    ) -> Result<CaptureOutcome, UploadError> {
        self.process(owner_id, image, mime)
            .await
            .map_err(|e: PipelineError| UploadError::Server(e.to_string()))
    }
}

/// Remote upload against a running backend's `/process-screenshot`.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    data: CaptureOutcomeWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptureOutcomeWire {
    image_url: String,
    analysis: crate::domain::ScreenshotAnalysis,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl HttpUploader {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ScreenshotUploader for HttpUploader {
    async fn upload(
        &self,
        owner_id: &str,
        image: Vec<u8>,
        mime: &str,
    ) -> Result<CaptureOutcome, UploadError> {
        let url = format!(
            "{}/process-screenshot",
            self.base_url.trim_end_matches('/')
        );

        let part = reqwest::multipart::Part::bytes(image)
            .file_name("screenshot.png")
            .mime_str(mime)
            .map_err(|_| UploadError::Server("unsupported image type".to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("screenshot", part)
            .text("userId", owner_id.to_string());

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::Connection)?;

        if resp.status().is_success() {
            let body: ProcessResponse = resp
                .json()
                .await
                .map_err(|_| UploadError::Server("malformed backend response".to_string()))?;
            Ok(CaptureOutcome {
                image_url: body.data.image_url,
                analysis: body.data.analysis,
            })
        } else {
            let message = resp
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "Upload failed".to_string());
            Err(UploadError::Server(message))
        }
    }
}
