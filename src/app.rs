//! Application state and router construction.
//!
//! Everything a handler needs is built once at startup and passed in through
//! [`AppState`]; there are no process-wide singletons.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    handlers, middleware,
    services::{
        credentials::CredentialService,
        download_bridge::{DownloadBridge, WorkerCommand},
        quota_service::QuotaGuard,
    },
    store::RecordStore,
};

/// Shared state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub credentials: CredentialService,
    pub quota: QuotaGuard,
    pub bridge: Arc<DownloadBridge>,
    pub downloads_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        credentials: CredentialService,
        bridge: DownloadBridge,
        downloads_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            quota: QuotaGuard::new(store.clone()),
            store,
            credentials,
            bridge: Arc::new(bridge),
            downloads_dir: Arc::new(downloads_dir.into()),
        }
    }

    /// Wire up credentials and the worker bridge from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn RecordStore>) -> Self {
        let credentials = CredentialService::new(
            &config.jwt_secret,
            config.token_ttl_hours,
            config.bcrypt_cost,
        );

        let bridge = DownloadBridge::new(
            WorkerCommand::new(&config.worker_program).arg(&config.worker_script),
            Duration::from_secs(config.worker_timeout_secs),
            config.max_concurrent_workers,
        );

        Self::new(store, credentials, bridge, config.downloads_dir.clone())
    }
}

/// Build the HTTP router.
///
/// # Route Groups
///
/// - Public: health, register, login, downloaded file retrieval
/// - Bearer token: API key management
/// - `X-API-Key`: downloads and usage statistics
pub fn router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route(
            "/api/keys/generate",
            post(handlers::api_keys::generate_key),
        )
        .route("/api/keys", get(handlers::api_keys::list_keys))
        .route(
            "/api/keys/{id}/deactivate",
            put(handlers::api_keys::deactivate_key),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::token_middleware,
        ));

    let keyed_routes = Router::new()
        .route(
            "/api/download/{platform}",
            post(handlers::downloads::download),
        )
        .route("/api/stats", get(handlers::stats::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::api_key_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/downloads/{filename}",
            get(handlers::files::serve_download),
        )
        .merge(account_routes)
        .merge(keyed_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
