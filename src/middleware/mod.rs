//! HTTP middleware components.
//!
//! Middleware run before route handlers and short-circuit requests that
//! lack valid credentials.

/// Bearer token and API key authentication middleware
pub mod auth;
