//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{services::download_bridge::BridgeError, store::StoreError};

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Credential Errors**: missing or invalid API keys and bearer tokens, bad logins
/// - **Quota Errors**: the key's daily allowance is used up
/// - **Validation Errors**: invalid request data
/// - **Bridge Errors**: the download worker could not be run or understood
/// - **Store Errors**: any persistence failure
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Record store operation failed.
    ///
    /// Returns HTTP 500; details are logged, not sent to the client.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No API key or bearer token was presented.
    ///
    /// Returns HTTP 401 Unauthorized. The string names what was missing.
    #[error("{0} required")]
    MissingCredential(&'static str),

    /// API key is unknown or has been deactivated.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid or inactive API key")]
    InvalidApiKey,

    /// Bearer token failed signature, issuer or expiry checks.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid or expired access token")]
    InvalidToken,

    /// Username/password pair did not match.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration with a username or email that already exists.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Username or email already registered")]
    DuplicateUser,

    /// The key already used its daily limit.
    ///
    /// Returns HTTP 429 Too Many Requests.
    #[error("Daily request limit exceeded")]
    QuotaExceeded,

    /// Key to deactivate does not exist or belongs to someone else.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// Requested downloaded file does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("File not found")]
    FileNotFound,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request with the given message.
    #[error("{0}")]
    InvalidRequest(String),

    /// The download worker crashed, timed out or produced unusable output.
    ///
    /// Returns HTTP 500 with the worker error embedded in the message.
    #[error("Download error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token signing failed: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MissingCredential(_) => (StatusCode::UNAUTHORIZED, "missing_credential"),
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::InvalidCredentials => (StatusCode::BAD_REQUEST, "invalid_credentials"),
            AppError::DuplicateUser => (StatusCode::BAD_REQUEST, "duplicate_user"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::QuotaExceeded => (StatusCode::TOO_MANY_REQUESTS, "quota_exceeded"),
            AppError::ApiKeyNotFound => (StatusCode::NOT_FOUND, "api_key_not_found"),
            AppError::FileNotFound => (StatusCode::NOT_FOUND, "file_not_found"),
            AppError::Bridge(_) => (StatusCode::INTERNAL_SERVER_ERROR, "download_failed"),
            AppError::Store(_) | AppError::PasswordHash(_) | AppError::TokenSigning(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": "Human-readable error message",
///   "code": "error_type"
/// }
/// ```
///
/// Internal failures (store, hashing, signing) are logged and replaced by a
/// generic message. Bridge failures keep their detail so callers can see why
/// the worker failed.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Store(_) | AppError::PasswordHash(_) | AppError::TokenSigning(_) => {
                tracing::error!(error = %self, "internal error");
                "An internal error occurred".to_string()
            }
            AppError::Bridge(_) => {
                tracing::error!(error = %self, "download bridge failure");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn quota_exceeded_is_429() {
        let (status, body) = body_json(AppError::QuotaExceeded).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["code"], "quota_exceeded");
        assert_eq!(body["error"], "Daily request limit exceeded");
    }

    #[tokio::test]
    async fn missing_credential_names_what_is_missing() {
        let (status, body) = body_json(AppError::MissingCredential("API key")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "API key required");
    }

    #[tokio::test]
    async fn bridge_failures_embed_worker_message() {
        let timeout = BridgeError::Timeout(std::time::Duration::from_secs(60));
        let (status, body) = body_json(AppError::Bridge(timeout)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "download_failed");
        assert_eq!(body["error"], "Download error: worker timed out after 60s");
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        let error = AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal error occurred");
    }

    #[test]
    fn bad_login_and_duplicates_are_client_errors() {
        assert_eq!(
            AppError::InvalidCredentials.status_and_code().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::DuplicateUser.status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidRequest("url is required".into()).status_and_code().0,
            StatusCode::BAD_REQUEST
        );
    }
}
