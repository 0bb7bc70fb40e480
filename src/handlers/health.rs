//! Liveness endpoint.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{app::AppState, error::AppError};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    /// Worker processes that could start right now
    pub idle_workers: usize,
    pub timestamp: DateTime<Utc>,
}

/// `GET /health`
///
/// Pings the record store; an unreachable store is the usual 500 error body.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.store.ping().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        database: "connected",
        idle_workers: state.bridge.available_permits(),
        timestamp: Utc::now(),
    }))
}
