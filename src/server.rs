use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::ai::{self, Embedder, LocalEmbedder, RemoteEmbedder, VisionClient};
use crate::api;
use crate::config::AppConfig;
use crate::persistence::{
    MemoryStore,
    providers::{postgres::PostgresStore, surreal::SurrealStore},
};
use crate::pipeline::CapturePipeline;
use crate::storage::LocalDiskStore;

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let http = ai::http_client(Duration::from_secs(config.ai.request_timeout_secs))?;

    // One embedder instance serves both the capture and the query path;
    // stored and query vectors therefore always share model and
    // dimensionality.
    let embedder: Arc<dyn Embedder> = match config.ai.embedding_provider.as_str() {
        "local" => Arc::new(LocalEmbedder::new()?),
        _ => Arc::new(RemoteEmbedder::new(
            http.clone(),
            &config.ai.base_url,
            config.ai.api_key.clone(),
            &config.ai.embedding_model,
            config.persistence.vector_dimension,
        )),
    };

    if embedder.dimension() != config.persistence.vector_dimension {
        anyhow::bail!(
            "embedder produces {}-dimensional vectors but persistence is configured for {}; \
             refusing to start with a mismatched index",
            embedder.dimension(),
            config.persistence.vector_dimension
        );
    }

    let store: Arc<dyn MemoryStore> = match config.persistence.provider.as_str() {
        "surrealdb" => Arc::new(SurrealStore::new(&config.persistence.database_url).await?),
        _ => Arc::new(PostgresStore::new(&config.persistence.database_url).await?),
    };

    let objects = Arc::new(LocalDiskStore::new(
        &config.storage.media_dir,
        &config.storage.public_base_url,
    ));

    let vision = Arc::new(VisionClient::new(
        http,
        &config.ai.base_url,
        config.ai.api_key.clone(),
        &config.ai.vision_model,
    ));

    let pipeline = Arc::new(CapturePipeline::new(objects, vision, embedder, store));
    let state = AppState { pipeline };

    let app = build_router(state, Some(Path::new(&config.storage.media_dir)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        provider = %config.persistence.provider,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Build the application router. Split out so HTTP tests can run against
/// the real routes with fake pipeline collaborators.
pub fn build_router(state: AppState, media_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/process-screenshot", post(api::process_screenshot))
        .route("/search", post(api::search))
        .route("/health", get(api::health));

    if let Some(dir) = media_dir {
        app = app.nest_service("/media", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // 50MB screenshots
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
    }
}
