//! API key management handlers. All routes require a bearer token.
//!
//! - POST /api/keys/generate - Create a key
//! - GET /api/keys - List the caller's keys
//! - PUT /api/keys/{id}/deactivate - Deactivate one of the caller's keys

use axum::{Extension, Json, extract::State};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::auth::AuthContext,
    models::{
        api_key::{ApiKey, GenerateKeyRequest, GenerateKeyResponse},
        user::MessageResponse,
    },
    services::api_key_service,
};

/// Generate a new API key for the authenticated user.
///
/// # Request Body
///
/// ```json
/// { "keyName": "my laptop" }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "apiKey": "api_3f9c...", "keyName": "my laptop" }
/// ```
pub async fn generate_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(request): ApiJson<GenerateKeyRequest>,
) -> Result<Json<GenerateKeyResponse>, AppError> {
    let generated =
        api_key_service::generate_key(state.store.as_ref(), auth.user_id, &request.key_name)
            .await?;

    Ok(Json(generated))
}

/// List every key owned by the authenticated user, newest first.
pub async fn list_keys(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ApiKey>>, AppError> {
    let keys = api_key_service::list_keys(state.store.as_ref(), auth.user_id).await?;

    Ok(Json(keys))
}

/// Deactivate a key. The key stays in the database but stops authenticating.
///
/// # Response
///
/// - **200 OK**: `{ "message": "API key deactivated" }`
/// - **400**: `id` is not a UUID
/// - **404**: key missing or owned by another user
pub async fn deactivate_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(key_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    api_key_service::deactivate_key(state.store.as_ref(), auth.user_id, key_id).await?;

    Ok(Json(MessageResponse::new("API key deactivated")))
}
