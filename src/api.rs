//! HTTP handlers for the capture backend.
//!
//! Three routes: `POST /process-screenshot` (multipart capture upload),
//! `POST /search` (free-text similarity query), `GET /health`. Errors
//! follow one shape: `{ "error": "..." }` with 400 for input rejection
//! and 500 for any pipeline-stage failure (root cause logged here, one
//! consolidated message to the client).

use crate::AppState;
use crate::persistence::DEFAULT_SEARCH_LIMIT;
use crate::pipeline::{CaptureOutcome, PipelineError};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid multipart payload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Multipart(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Pipeline(e) => {
                tracing::error!(error = ?e, "pipeline failure");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessScreenshotResponse {
    pub message: String,
    pub data: CaptureOutcome,
}

/// POST /process-screenshot - run one capture through the pipeline.
pub async fn process_screenshot(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessScreenshotResponse>, ApiError> {
    let mut screenshot: Option<(Vec<u8>, String)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("screenshot") => {
                let content_type = field
                    .content_type()
                    .map_or_else(|| "image/png".to_string(), ToString::to_string);
                let bytes = field.bytes().await?;
                screenshot = Some((bytes.to_vec(), content_type));
            }
            Some("userId") => {
                user_id = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let (image, mime) =
        screenshot.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let user_id = user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))?;

    let outcome = state.pipeline.process(&user_id, image, &mime).await?;

    Ok(Json(ProcessScreenshotResponse {
        message: "Screenshot processed successfully".to_string(),
        data: outcome,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<crate::domain::SearchResult>,
}

/// POST /search - embed the query and run an owner-scoped search.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = req.query.filter(|q| !q.trim().is_empty());
    let user_id = req.user_id.filter(|u| !u.trim().is_empty());
    let (Some(query), Some(user_id)) = (query, user_id) else {
        return Err(ApiError::BadRequest(
            "Query and User ID are required".to_string(),
        ));
    };

    tracing::info!(name: "search.requested", owner_id = %user_id, query = %query, "Search request");

    let results = state
        .pipeline
        .search(&user_id, &query, DEFAULT_SEARCH_LIMIT)
        .await?;

    Ok(Json(SearchResponse { results }))
}

/// GET /health - liveness probe.
pub async fn health() -> &'static str {
    "Recall backend is healthy"
}
