//! User account model and the register/login request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user record from the database.
///
/// Users are created at registration and never modified afterwards.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Unique contact address
    pub email: String,

    /// bcrypt hash of the password; the plaintext is never stored
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Request body for `POST /auth/register`.
///
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "correct horse"
/// }
/// ```
///
/// Missing fields deserialize as empty strings and are rejected during validation.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Generic `{ "message": ... }` response used by register and deactivate.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for a successful login.
///
/// ```json
/// {
///   "token": "eyJhbGciOi...",
///   "userId": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}
