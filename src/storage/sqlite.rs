//! SQLite implementation of the result store

use crate::audit::{RuleConfig, ScanResult};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultStore, StorageError, StorageResult};
use crate::storage::{ResultSummary, ScheduledTarget, SchedulerSettings};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

/// SQLite-backed result store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn parse_timestamp(raw: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StorageError::Serialization(format!("bad timestamp {raw:?}: {e}")))
    }

    fn parse_config(raw: &str) -> RuleConfig {
        // A malformed stored config degrades to engine defaults instead of
        // making the whole target list unreadable
        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable stored rule config, using defaults");
            RuleConfig::default()
        })
    }
}

/// Returns true when the error is a UNIQUE-constraint violation
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl ResultStore for SqliteStore {
    // ===== Scan results =====

    fn insert_result(&mut self, result: &ScanResult) -> StorageResult<i64> {
        let result_json = serde_json::to_string(result)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO results (url, timestamp, violations, passes, incomplete, result_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                result.url,
                result.timestamp.to_rfc3339(),
                result.violations.len() as i64,
                result.passes.len() as i64,
                result.incomplete.len() as i64,
                result_json,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_result_summaries(&self) -> StorageResult<Vec<ResultSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, timestamp, violations, passes, incomplete
             FROM results ORDER BY timestamp DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, url, timestamp, violations, passes, incomplete) = row?;
            summaries.push(ResultSummary {
                id,
                url,
                timestamp: Self::parse_timestamp(&timestamp)?,
                violation_count: violations,
                pass_count: passes,
                incomplete_count: incomplete,
            });
        }

        Ok(summaries)
    }

    fn get_result_by_id(&self, id: i64) -> StorageResult<Option<ScanResult>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT result_json FROM results WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    // ===== Scheduled targets =====

    fn insert_scheduled_target(
        &mut self,
        url: &str,
        config: &RuleConfig,
    ) -> StorageResult<ScheduledTarget> {
        let config_json = serde_json::to_string(config)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let inserted = self.conn.execute(
            "INSERT INTO scheduled_targets (url, config_json) VALUES (?1, ?2)",
            params![url, config_json],
        );

        match inserted {
            Ok(_) => Ok(ScheduledTarget {
                id: self.conn.last_insert_rowid(),
                url: url.to_string(),
                config: config.clone(),
            }),
            Err(e) if is_unique_violation(&e) => Err(StorageError::Conflict(url.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_scheduled_target(&mut self, id: i64) -> StorageResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM scheduled_targets WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn list_scheduled_targets(&self) -> StorageResult<Vec<ScheduledTarget>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, url, config_json FROM scheduled_targets ORDER BY id DESC")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut targets = Vec::new();
        for row in rows {
            let (id, url, config_json) = row?;
            targets.push(ScheduledTarget {
                id,
                url,
                config: Self::parse_config(&config_json),
            });
        }

        Ok(targets)
    }

    fn update_scheduled_target_config(
        &mut self,
        id: i64,
        config: &RuleConfig,
    ) -> StorageResult<bool> {
        let config_json = serde_json::to_string(config)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let changed = self.conn.execute(
            "UPDATE scheduled_targets SET config_json = ?1 WHERE id = ?2",
            params![config_json, id],
        )?;
        Ok(changed > 0)
    }

    // ===== Scheduler settings =====

    fn get_scheduler_settings(&self) -> StorageResult<SchedulerSettings> {
        let settings = self
            .conn
            .query_row(
                "SELECT enabled, cron FROM scheduler_settings WHERE id = 1",
                [],
                |row| {
                    Ok(SchedulerSettings {
                        enabled: row.get::<_, i64>(0)? != 0,
                        cron: row.get(1)?,
                    })
                },
            )
            .optional()?;

        // The seed row is created at schema init; a missing row can only
        // happen on a hand-edited database, so fall back to defaults
        Ok(settings.unwrap_or_default())
    }

    fn update_scheduler_settings(&mut self, settings: &SchedulerSettings) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "UPDATE scheduler_settings SET enabled = ?1, cron = ?2 WHERE id = 1",
            params![settings.enabled as i64, settings.cron],
        )?;
        Ok(changed > 0)
    }

    // ===== Default rule config =====

    fn get_default_rule_config(&self) -> StorageResult<RuleConfig> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT config_json FROM default_rule_config WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.as_deref().map(Self::parse_config).unwrap_or_default())
    }

    fn set_default_rule_config(&mut self, config: &RuleConfig) -> StorageResult<()> {
        let config_json = serde_json::to_string(config)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT INTO default_rule_config (id, config_json) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET config_json = excluded.config_json",
            params![config_json],
        )?;
        Ok(())
    }
}
