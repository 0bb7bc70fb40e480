//! Authentication middleware.
//!
//! Two schemes protect two route groups:
//!
//! - `Authorization: Bearer <token>` for account routes (API key management);
//!   injects [`AuthContext`]
//! - `X-API-Key: <key>` for download and stats routes; injects [`KeyContext`]
//!
//! Both reject with HTTP 401 before the handler runs.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{app::AppState, error::AppError, models::api_key::ApiKey};

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Identity of a user authenticated by bearer token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

/// The active API key a request was made with.
///
/// Only identifies the key; quota admission happens in the download handler.
#[derive(Debug, Clone)]
pub struct KeyContext {
    pub key: ApiKey,
}

/// Bearer token middleware.
///
/// # Flow
///
/// 1. Read `Authorization: Bearer <token>`; absent → `MissingCredential`
/// 2. Verify signature, issuer and expiry; failure → `InvalidToken`
/// 3. Inject `AuthContext` and call the next handler
pub async fn token_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingCredential("Access token"))?;

    let claims = state
        .credentials
        .verify_token(token)
        .map_err(|_| AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(request).await)
}

/// API key middleware.
///
/// # Flow
///
/// 1. Read `X-API-Key`; absent → `MissingCredential` without touching the store
/// 2. Look up an active key with that value; none → `InvalidApiKey`
/// 3. Inject `KeyContext` and call the next handler
pub async fn api_key_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let key = state.quota.authenticate(presented).await?;

    request.extensions_mut().insert(KeyContext { key });

    Ok(next.run(request).await)
}
