//! Registration and login handlers.
//!
//! - POST /auth/register - Create a user account
//! - POST /auth/login - Exchange username/password for a bearer token

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    app::AppState,
    error::AppError,
    extract::ApiJson,
    models::user::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
    services::auth_service,
};

/// Register a new user.
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "email": "alice@example.com", "password": "..." }
/// ```
///
/// # Response
///
/// - **201 Created**: `{ "message": "User registered successfully" }`
/// - **400**: missing fields, or username/email already taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    auth_service::register(state.store.as_ref(), &state.credentials, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Log in and receive a bearer token valid for the configured TTL.
///
/// # Response
///
/// - **200 OK**: `{ "token": "...", "userId": "..." }`
/// - **400**: unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = auth_service::login(state.store.as_ref(), &state.credentials, request).await?;

    Ok(Json(response))
}
