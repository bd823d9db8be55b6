use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP backend (default)
    Serve,
    /// Push a PNG file through the capture dispatcher to a running backend
    Capture {
        /// PNG file to capture
        #[arg(long)]
        file: PathBuf,

        /// Backend base URL
        #[arg(long, default_value = "http://127.0.0.1:3001")]
        server: String,

        /// Owner id to record the memory under (guest id if omitted)
        #[arg(long)]
        owner: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub persistence: PersistenceConfig,
    pub storage: StorageConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    /// "postgres" or "surrealdb".
    pub provider: String,
    pub database_url: String,
    /// Must equal the embedder's output dimensionality; checked at startup.
    pub vector_dimension: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub media_dir: String,
    /// Externally reachable server origin, used to build image URLs.
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// OpenAI-compatible provider base URL (vision + embeddings).
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub vision_model: String,
    /// "remote" (provider API) or "local" (fastembed).
    pub embedding_provider: String,
    pub embedding_model: String,
    /// Bounded timeout for every outbound model call.
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Layered load: defaults, then an optional YAML file, then
    /// `RECALL_`-prefixed environment variables (`__` separator), then
    /// explicit CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default("persistence.provider", "postgres")?
            .set_default("persistence.database_url", "postgres://localhost/recall")?
            .set_default("persistence.vector_dimension", 768)?
            .set_default("storage.media_dir", "media")?
            .set_default("storage.public_base_url", "http://localhost:3001")?
            .set_default("ai.base_url", "https://api.openai.com")?
            .set_default("ai.vision_model", "gpt-4o-mini")?
            .set_default("ai.embedding_provider", "remote")?
            .set_default("ai.embedding_model", "text-embedding-3-small")?
            .set_default("ai.request_timeout_secs", 30)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else if std::path::Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("RECALL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
