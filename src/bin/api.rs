//! Eventweek API Server
//!
//! Run with: cargo run --bin eventweek-api
//!
//! # Configuration
//!
//! Read from the first `config.toml` found (user config dir,
//! `/etc/eventweek`, working directory), then overridden by:
//! - `EVENTWEEK_DATA_SOURCE` / `DATA_SOURCE`: `file` or `relational`
//! - `EVENTWEEK_DATA_DIR`, `EVENTWEEK_SQLITE_PATH`
//! - `EVENTWEEK_API_HOST`, `EVENTWEEK_API_PORT`
//! - `EVENTWEEK_ADMIN_TOKEN`: enables admin writes
//! - `EVENTWEEK_MEDIA_ROOT`: directory image URLs resolve against
//! - `RUST_LOG`: Log filter (default: the configured level)

use eventweek::api::{serve, ApiConfig, AppState};
use eventweek::config::{Config, LoggingConfig};
use eventweek::storage::EventStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Eventweek API server v{}", env!("CARGO_PKG_VERSION"));

    let backend_config = config.storage.backend_config();
    tracing::info!(
        backend = %backend_config.kind,
        data_dir = ?backend_config.data_dir,
        sqlite_path = ?backend_config.sqlite_path,
        "Opening event store"
    );
    let store = Arc::new(EventStore::open(&backend_config)?);

    let api_config = ApiConfig::from_settings(&config.api);
    if api_config.admin_token.is_none() {
        tracing::warn!("No admin token configured; all write requests will be rejected");
    }

    let state = AppState::new(store, api_config.clone());
    serve(state, &api_config).await?;

    tracing::info!("Eventweek API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("eventweek={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
