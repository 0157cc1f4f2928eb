use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use fademaster::config::AppConfig;
use fademaster::db;
use fademaster::handlers;
use fademaster::services::booking_store::BookingStore;
use fademaster::services::clock::SystemClock;
use fademaster::services::shell::{
    CacheStorage, HttpNetwork, Network, OfflineShell, SqliteCacheStorage,
};
use fademaster::services::storage::SqliteStorage;
use fademaster::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = Arc::new(Mutex::new(db::init_db(&config.database_url)?));

    let store = BookingStore::open(
        SqliteStorage::new(Arc::clone(&conn)),
        Arc::new(SystemClock),
        config.utc_offset(),
    );

    let network: Box<dyn Network> = Box::new(
        HttpNetwork::new(&config.shell_origin)
            .with_context(|| format!("invalid SHELL_ORIGIN {}", config.shell_origin))?,
    );
    let cache: Box<dyn CacheStorage> = Box::new(SqliteCacheStorage::new(Arc::clone(&conn)));
    tracing::info!("serving shell from {}", config.shell_origin);
    let shell = OfflineShell::new(network, cache);

    let state = Arc::new(AppState {
        config: config.clone(),
        store: Mutex::new(store),
        shell,
    });

    // Requests are passed straight through until the shell is active.
    let starter = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = starter.shell.start().await {
            tracing::warn!(error = %e, "offline shell not started, serving from network only");
        }
    });

    let app = handlers::router(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
