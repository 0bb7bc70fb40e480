//! HTTP request handlers (route handlers).
//!
//! Each handler extracts request data, delegates to a service and maps the
//! result to a JSON response.

/// API key management endpoints
pub mod api_keys;
/// Registration and login
pub mod auth;
/// Media download endpoint
pub mod downloads;
/// Downloaded file retrieval
pub mod files;
pub mod health;
/// Per-key usage statistics
pub mod stats;
