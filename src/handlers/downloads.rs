//! Download handler.
//!
//! - POST /api/download/{platform} - Run the worker for youtube, facebook,
//!   tiktok, instagram or spotify

use axum::{Extension, Json, extract::State};
use serde_json::Value;

use crate::{
    app::AppState,
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::auth::KeyContext,
    models::download::{DownloadRequest, Platform, UnknownVariant},
    services::download_service,
};

/// Download media from `platform`.
///
/// # Request Body
///
/// ```json
/// { "url": "https://www.youtube.com/watch?v=...", "type": "mp3" }
/// ```
///
/// `type` defaults to mp3 for spotify and mp4 everywhere else.
///
/// # Response
///
/// - **200 OK**: the worker's JSON, including `"success": false` results
/// - **400**: unknown platform, malformed body, missing url, or unsupported type
/// - **401**: missing, unknown or inactive API key
/// - **429**: daily limit reached
/// - **500**: worker crashed, timed out or printed something unparseable
///
/// # Accounting
///
/// The quota check runs before body validation. Every admitted request
/// increments the key's `request_count`, including ones that then fail
/// validation or the worker.
pub async fn download(
    State(state): State<AppState>,
    ApiPath(platform): ApiPath<String>,
    Extension(ctx): Extension<KeyContext>,
    ApiJson(request): ApiJson<DownloadRequest>,
) -> Result<Json<Value>, AppError> {
    let platform: Platform = platform
        .parse()
        .map_err(|e: UnknownVariant| AppError::InvalidRequest(format!("platform: {e}")))?;

    let key = state.quota.admit(&ctx.key).await?;

    let result = download_service::execute(
        state.store.as_ref(),
        &state.bridge,
        &key.key_value,
        platform,
        request,
    )
    .await?;

    Ok(Json(result))
}
