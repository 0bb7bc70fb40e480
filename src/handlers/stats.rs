//! Usage statistics handler.

use axum::{Extension, Json, extract::State};

use crate::{
    app::AppState, error::AppError, middleware::auth::KeyContext,
    models::download::StatsResponse, services::stats_service,
};

/// Usage report for the presented API key.
///
/// # Endpoint
///
/// `GET /api/stats` with `X-API-Key`
///
/// # Response (200)
///
/// ```json
/// {
///   "totalDownloads": 3,
///   "successfulDownloads": 2,
///   "todayDownloads": 2,
///   "dailyLimit": 100,
///   "remainingToday": 98
/// }
/// ```
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<KeyContext>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = stats_service::key_stats(state.store.as_ref(), &ctx.key).await?;

    Ok(Json(stats))
}
