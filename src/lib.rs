//! a11y-beacon: an accessibility-audit dashboard backend
//!
//! This crate drives an external accessibility engine against URLs, persists
//! summarized and full scan reports, fans scans out across whole sitemaps
//! with pollable job progress, and runs recurring scans on a persisted cron
//! schedule that can be changed at runtime.

pub mod audit;
pub mod config;
pub mod jobs;
pub mod scheduler;
pub mod server;
pub mod sitemap;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for a11y-beacon operations
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Audit engine error: {0}")]
    Engine(#[from] audit::EngineError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] sitemap::SitemapError),

    #[error("Cron error: {0}")]
    Cron(#[from] scheduler::CronError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for a11y-beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use audit::{Finding, RuleConfig, ScanExecutor, ScanResult};
pub use config::Config;
pub use jobs::{JobStatus, JobTracker, SitemapJob};
pub use scheduler::SchedulerController;
pub use storage::{ResultStore, ScheduledTarget, SchedulerSettings, SharedStore, SqliteStore};
pub use url::normalize_url;
