//! Libris Library Backend
//!
//! A REST JSON API where users curate a personal book collection imported on
//! demand from the Google Books catalog, authenticated by JWT bearer tokens
//! or long-lived API keys.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod provider;
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
