//! Persistence layer for scan results, scheduled targets, and settings
//!
//! The [`ResultStore`] trait is the gateway every other component talks
//! through; [`SqliteStore`] is the shipped implementation.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ResultStore, StorageError, StorageResult};

use crate::audit::RuleConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Shared handle to the result store.
///
/// All mutation goes through short-lived lock scopes; the lock is never
/// held across an await point.
pub type SharedStore = Arc<Mutex<dyn ResultStore>>;

/// Summary row for the result history listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub violation_count: i64,
    pub pass_count: i64,
    pub incomplete_count: i64,
}

/// A URL registered for recurring scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTarget {
    /// Stable key assigned at creation, never reused
    pub id: i64,

    /// Canonical URL; unique across all scheduled targets
    pub url: String,

    /// Per-target rule configuration (empty = engine defaults)
    #[serde(default)]
    pub config: RuleConfig,
}

/// Singleton recurring-scan configuration.
///
/// Exactly one settings record exists; updates are full replacements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    pub enabled: bool,

    /// Five-field cron expression
    pub cron: String,
}

impl Default for SchedulerSettings {
    /// First-startup defaults: enabled, daily at 02:00
    fn default() -> Self {
        Self {
            enabled: true,
            cron: "0 2 * * *".to_string(),
        }
    }
}
