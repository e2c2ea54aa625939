// Budget Accounts API - Web Server

use anyhow::Context;
use rusqlite::Connection;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use budget_accounts::{
    router, set_expose_stack, setup_database, AppState, Limits, ServerConfig, SqliteStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    set_expose_stack(config.expose_stack);

    // Open (or create) the database
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("failed to open database at {}", config.database_path))?;
    setup_database(&conn).context("failed to set up database schema")?;
    tracing::info!(path = %config.database_path, "database ready");

    // Shared state: the store behind its trait seam, bounds from policy
    let store = Arc::new(SqliteStore::new(conn));
    let state = AppState::new(store, Limits::default());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(addr = %listener.local_addr()?, version = budget_accounts::VERSION, "accounts API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
