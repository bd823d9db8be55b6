//! Vision analysis of captured screenshots.
//!
//! Sends the image to an OpenAI-compatible chat completions endpoint with
//! a fixed instruction and decodes the model's free-form reply into a
//! strict [`ScreenshotAnalysis`]. The model frequently wraps its JSON in
//! prose or code fences, so decoding goes through [`extract_json_object`]
//! rather than trusting the raw reply.

use crate::domain::ScreenshotAnalysis;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Fixed instruction sent with every screenshot.
const ANALYSIS_PROMPT: &str = "\
Analyze this screenshot and provide:
1. A short summary (2 lines).
2. A list of 5-15 relevant tags.
3. A category classification (e.g., Web Development, Social Media, Documentation, UI Design, etc.).

Return the result strictly as a JSON object with the following structure:
{
  \"summary\": \"...\",
  \"tags\": [\"...\", \"...\"],
  \"category\": \"...\"
}";

/// Failure modes of the analysis stage.
///
/// `Unparsable` is deliberately distinct from transport failure: the
/// upstream answered, but not with anything we are willing to persist.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision model request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("vision model returned an empty response")]
    EmptyResponse,
    #[error("AI response unparsable")]
    Unparsable,
}

/// Produces a structured description of an image.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync + std::fmt::Debug {
    async fn analyze(&self, image: &[u8], mime: &str) -> Result<ScreenshotAnalysis, VisionError>;
}

/// OpenAI-compatible vision client (`/v1/chat/completions`, non-streaming).
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl VisionClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl VisionAnalyzer for VisionClient {
    async fn analyze(&self, image: &[u8], mime: &str) -> Result<ScreenshotAnalysis, VisionError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(image));

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": ANALYSIS_PROMPT },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }]
        });

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp: ChatResponse = rb.send().await?.error_for_status()?.json().await?;
        let text = resp
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or(VisionError::EmptyResponse)?;

        parse_analysis(text)
    }
}

/// Decode the model's reply into a [`ScreenshotAnalysis`].
///
/// Single attempt, no retry: a reply we cannot decode strictly is
/// rejected rather than guessed at.
pub fn parse_analysis(text: &str) -> Result<ScreenshotAnalysis, VisionError> {
    let span = extract_json_object(text).ok_or(VisionError::Unparsable)?;
    serde_json::from_str(span).map_err(|_| VisionError::Unparsable)
}

/// Locate the JSON object span in a possibly fenced or prose-wrapped reply.
///
/// Takes everything from the first `{` to the last `}`, which tolerates
/// ```` ```json ```` fences and leading/trailing chatter.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}
