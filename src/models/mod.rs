//! Data models representing database entities and API payloads.

/// API key (quota bucket) model
pub mod api_key;
/// Download records, platforms and formats
pub mod download;
/// User account model
pub mod user;
