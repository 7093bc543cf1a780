//! login-server binary.
//!
//! Reads the optional TOML file given with `--config` and the
//! `MU_APPLICATION_*` environment, opens the SQLite graph store, and serves
//! the session endpoints over HTTP.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use login_api::AppState;
use login_core::resource::ResourceUris;
use login_oidc::OidcClient;
use login_server::ServerConfig;
use login_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ACM/IDM login session service")]
struct Cli {
  /// Path to an optional TOML configuration file.
  #[arg(short, long)]
  config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let vars: HashMap<String, String> = std::env::vars_os()
    .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
    .collect();
  let cfg = ServerConfig::load(cli.config.as_deref(), vars)
    .context("invalid configuration")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let stats = store.stats().await.context("failed to read the store")?;
  info!(
    groups = stats.groups,
    accounts = stats.accounts,
    sessions = stats.sessions,
    "opened graph store"
  );

  let provider =
    OidcClient::new(cfg.oidc.clone()).context("failed to build the OpenID client")?;
  if let Err(e) = provider.discover().await {
    warn!(error = %e, "identity provider discovery failed; retrying on first login");
  }

  let state = AppState {
    store:    Arc::new(store),
    provider: Arc::new(provider),
    uris:     Arc::new(ResourceUris::new(cfg.resource_base.clone())),
    claims:   Arc::new(cfg.claims.clone()),
  };

  let app = login_api::router(state);
  let address = format!("{}:{}", cfg.host, cfg.port);

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
