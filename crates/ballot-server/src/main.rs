//! Ballot server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `BALLOT_*` environment variables on top, opens the SQLite store, and serves
//! the JSON API over HTTP.

mod server_config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use ballot_api::ApiState;
use ballot_core::Ballot;
use ballot_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::server_config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Ballot content voting server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

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
    .add_source(config::Environment::with_prefix("BALLOT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  let api_settings = server_cfg
    .api_settings()
    .context("invalid default rating range")?;

  // Open SQLite store.
  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let ballot = Ballot::with_options(Arc::new(store), server_cfg.ballot_options());
  let state = ApiState { ballot: Arc::new(ballot), settings: api_settings };
  let app = ballot_api::api_router(state).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
    .await
    .context("server error")?;

  Ok(())
}
