//! Media download API - main application entry point.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build application state and HTTP router
//! 5. Start server on configured port

use std::sync::Arc;

use media_download_api::{app, config, db, store::postgres::PgStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!(max_connections = config.database_max_connections, "Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    tokio::fs::create_dir_all(&config.downloads_dir).await?;

    let state = app::AppState::from_config(&config, Arc::new(PgStore::new(pool)));
    tracing::info!(
        worker = %config.worker_program,
        script = %config.worker_script,
        max_concurrent_workers = config.max_concurrent_workers,
        timeout_secs = config.worker_timeout_secs,
        "Download worker configured"
    );

    let app = app::router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
