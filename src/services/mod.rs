//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They receive their collaborators (record store, credential service,
//! download bridge) explicitly rather than reaching for globals.

pub mod api_key_service;
pub mod auth_service;
pub mod credentials;
pub mod download_bridge;
pub mod download_service;
pub mod quota_service;
pub mod stats_service;
