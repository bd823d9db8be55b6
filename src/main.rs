//! Recall server and capture CLI entry point.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use clap::Parser;
use dotenvy::dotenv;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use recall::ai;
use recall::capture::{
    CaptureDispatcher, DetachedTabs, GUEST_OWNER_ID, HttpUploader, StatusLevel, to_data_url,
};
use recall::config::{AppConfig, Cli, Command};
use recall::server::start_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Capture {
            ref file,
            ref server,
            ref owner,
        }) => run_capture(file, server, owner.as_deref()).await,
        Some(Command::Serve) | None => {
            let config = match AppConfig::load(&cli) {
                Ok(c) => Arc::new(c),
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    std::process::exit(1);
                }
            };
            start_server(config).await
        }
    }
}

/// Push a PNG through the capture dispatcher against a running backend.
///
/// Uses the paste trigger: the file stands in for a clipboard image, and
/// the success/failure toast is relayed to the terminal.
async fn run_capture(file: &Path, server: &str, owner: Option<&str>) -> anyhow::Result<()> {
    let image = tokio::fs::read(file).await?;
    let mime = mime_guess::from_path(file)
        .first_raw()
        .unwrap_or(recall::domain::capture::CAPTURE_MIME);
    let owner = owner.unwrap_or(GUEST_OWNER_ID);

    let http = ai::http_client(Duration::from_secs(120))?;
    let uploader = Arc::new(HttpUploader::new(http, server));
    let dispatcher = Arc::new(CaptureDispatcher::new(
        uploader,
        Arc::new(DetachedTabs),
        owner,
    ));

    let mut toasts = dispatcher.status().attach_ui();
    let (bus, _task) = dispatcher.spawn();

    bus.upload_pasted_image(to_data_url(mime, &image)).await?;

    while let Some(toast) = toasts.recv().await {
        match toast.level {
            StatusLevel::Info => info!("{}", toast.message),
            StatusLevel::Success => {
                info!("{}", toast.message);
                return Ok(());
            }
            StatusLevel::Error => anyhow::bail!(toast.message),
        }
    }

    anyhow::bail!("capture dispatcher exited without reporting a result")
}
