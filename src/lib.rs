//! Library Management Server
//!
//! A REST JSON API for a small lending library: a book catalog, user
//! accounts with JWT sessions, and borrowings with a per-user limit and an
//! overdue sweeper that returns late books automatically.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
