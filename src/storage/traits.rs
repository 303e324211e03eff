//! Storage trait and error types

use crate::audit::{RuleConfig, ScanResult};
use crate::storage::{ResultSummary, ScheduledTarget, SchedulerSettings};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Already registered: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Record store consumed by the scan orchestration components.
///
/// Implementations persist full scan reports alongside summary columns,
/// the scheduled-target set, and the singleton scheduler settings.
pub trait ResultStore: Send {
    // ===== Scan results =====

    /// Persists a scan result, returning its assigned id
    fn insert_result(&mut self, result: &ScanResult) -> StorageResult<i64>;

    /// Lists result summaries, newest first
    fn list_result_summaries(&self) -> StorageResult<Vec<ResultSummary>>;

    /// Fetches the full report for one result
    fn get_result_by_id(&self, id: i64) -> StorageResult<Option<ScanResult>>;

    // ===== Scheduled targets =====

    /// Registers a URL for recurring scanning.
    ///
    /// The URL must already be canonical. Fails with
    /// [`StorageError::Conflict`] when the URL is already registered.
    fn insert_scheduled_target(
        &mut self,
        url: &str,
        config: &RuleConfig,
    ) -> StorageResult<ScheduledTarget>;

    /// Removes a scheduled target; returns false when the id is unknown
    fn delete_scheduled_target(&mut self, id: i64) -> StorageResult<bool>;

    /// Lists all scheduled targets, most recently registered first
    fn list_scheduled_targets(&self) -> StorageResult<Vec<ScheduledTarget>>;

    /// Replaces one target's rule config; returns false when the id is unknown
    fn update_scheduled_target_config(
        &mut self,
        id: i64,
        config: &RuleConfig,
    ) -> StorageResult<bool>;

    // ===== Scheduler settings =====

    /// Reads the singleton settings record
    fn get_scheduler_settings(&self) -> StorageResult<SchedulerSettings>;

    /// Fully replaces the singleton settings record
    fn update_scheduler_settings(&mut self, settings: &SchedulerSettings) -> StorageResult<bool>;

    // ===== Default rule config =====

    /// Reads the process-wide default rule config (empty when unset)
    fn get_default_rule_config(&self) -> StorageResult<RuleConfig>;

    /// Replaces the process-wide default rule config
    fn set_default_rule_config(&mut self, config: &RuleConfig) -> StorageResult<()>;
}
