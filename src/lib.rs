//! Media download API.
//!
//! HTTP backend that issues API keys, authenticates users, enforces a daily
//! per-key request quota, and forwards download requests for YouTube,
//! Facebook, TikTok, Instagram and Spotify to an external worker process.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the [`store::RecordStore`] trait
//! - **Authentication**: bcrypt passwords, HS256 bearer tokens, `X-API-Key` keys
//! - **Worker**: external program run per request through [`services::download_bridge`]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

pub use app::{AppState, router};
pub use error::AppError;
