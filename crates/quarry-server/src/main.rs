//! quarry server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the catalog API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::{
  Json, Router,
  http::StatusCode,
  response::IntoResponse,
  routing::get,
};
use clap::Parser;
use quarry_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quarry dataset catalog server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `QUARRY_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("quarry.db") }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("QUARRY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the store; schema and indexes are created here.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let app = Router::new()
    .route("/", get(index))
    .merge(quarry_api::api_router(Arc::new(store)))
    .fallback(not_found)
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// `GET /` — service index.
async fn index() -> Json<serde_json::Value> {
  Json(json!({
    "message": "Quarry Dataset Catalog API",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

async fn not_found() -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(json!({ "error": "resource not found" })),
  )
}
