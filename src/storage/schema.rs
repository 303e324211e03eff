//! Database schema definitions
//!
//! All SQL schema for the a11y-beacon database. Statements are idempotent
//! so opening an existing database is a no-op.

use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Full scan reports with denormalized summary counts
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    violations INTEGER NOT NULL,
    passes INTEGER NOT NULL,
    incomplete INTEGER NOT NULL,
    result_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_url ON results(url);
CREATE INDEX IF NOT EXISTS idx_results_timestamp ON results(timestamp);

-- URLs registered for recurring scanning; url holds the canonical form
CREATE TABLE IF NOT EXISTS scheduled_targets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    config_json TEXT NOT NULL DEFAULT '{}'
);

-- Singleton recurring-scan settings; the CHECK pins the row count to one
CREATE TABLE IF NOT EXISTS scheduler_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    enabled INTEGER NOT NULL DEFAULT 1,
    cron TEXT NOT NULL DEFAULT '0 2 * * *'
);

-- Singleton process-wide default rule configuration
CREATE TABLE IF NOT EXISTS default_rule_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    config_json TEXT NOT NULL DEFAULT '{}'
);
"#;

/// Seed rows for the singleton tables, inserted once on first startup
const SEED_SQL: &str = r#"
INSERT OR IGNORE INTO scheduler_settings (id, enabled, cron) VALUES (1, 1, '0 2 * * *');
INSERT OR IGNORE INTO default_rule_config (id, config_json) VALUES (1, '{}');
"#;

/// Initializes the database schema and singleton rows
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(SEED_SQL)?;
    Ok(())
}
