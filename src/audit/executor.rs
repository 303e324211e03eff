//! Scan executor
//!
//! Wraps one audit engine invocation with fault-absorbing semantics: every
//! call produces a well-formed [`ScanResult`], so partial failure is carried
//! in data rather than control flow and every call site can persist results
//! uniformly.

use crate::audit::{AuditEngine, Finding, RuleConfig, ScanResult};
use crate::storage::{ResultStore, SharedStore};
use chrono::Utc;
use std::sync::Arc;

/// Help text marking the synthetic finding of a failed scan
pub const SCAN_ERROR_HELP: &str = "Scan Error";

/// Single-attempt scan execution over an [`AuditEngine`].
///
/// Cheap to clone; all clones share the underlying engine.
#[derive(Clone)]
pub struct ScanExecutor {
    engine: Arc<dyn AuditEngine>,
}

impl ScanExecutor {
    pub fn new(engine: Arc<dyn AuditEngine>) -> Self {
        Self { engine }
    }

    /// Runs one scan against `url` with `config` applied verbatim.
    ///
    /// Never fails. Engine errors of any kind (navigation timeout, engine
    /// crash, unreachable engine) are folded into a degraded result whose
    /// `violations` hold exactly one synthetic finding with
    /// `help == "Scan Error"` and the failure message as description.
    pub async fn scan(&self, url: &str, config: &RuleConfig) -> ScanResult {
        match self.engine.analyze(url, config).await {
            Ok(report) => ScanResult {
                url: url.to_string(),
                timestamp: Utc::now(),
                violations: report.violations,
                passes: report.passes,
                incomplete: report.incomplete,
            },
            Err(e) => {
                tracing::warn!(url, error = %e, "Scan failed, recording degraded result");
                ScanResult {
                    url: url.to_string(),
                    timestamp: Utc::now(),
                    violations: vec![Finding {
                        id: "scan-error".to_string(),
                        impact: None,
                        tags: Vec::new(),
                        help: SCAN_ERROR_HELP.to_string(),
                        help_url: String::new(),
                        description: e.to_string(),
                        nodes: Vec::new(),
                    }],
                    passes: Vec::new(),
                    incomplete: Vec::new(),
                }
            }
        }
    }
}

/// Scans one URL and persists the outcome.
///
/// The shared primitive behind sitemap jobs, scheduled sweeps, and ad-hoc
/// scan requests. The URL is assumed already canonical. A persistence
/// failure is logged and swallowed so batch sweeps keep moving; the scan
/// result is returned either way, with the assigned row id when the insert
/// succeeded.
pub async fn scan_and_store(
    executor: &ScanExecutor,
    store: &SharedStore,
    url: &str,
    config: &RuleConfig,
) -> (ScanResult, Option<i64>) {
    let result = executor.scan(url, config).await;

    let inserted = {
        let mut store = store.lock().unwrap();
        store.insert_result(&result)
    };

    let id = match inserted {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!(url, error = %e, "Failed to persist scan result");
            None
        }
    };

    (result, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{EngineError, EngineReport};
    use crate::storage::{ResultStore, SqliteStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Engine stub that fails every call
    struct FailingEngine;

    #[async_trait]
    impl AuditEngine for FailingEngine {
        async fn analyze(
            &self,
            url: &str,
            _config: &RuleConfig,
        ) -> Result<EngineReport, EngineError> {
            Err(EngineError::Decode {
                url: url.to_string(),
                message: "navigation timeout".to_string(),
            })
        }
    }

    /// Engine stub that returns a fixed report
    struct FixedEngine(EngineReport);

    #[async_trait]
    impl AuditEngine for FixedEngine {
        async fn analyze(
            &self,
            _url: &str,
            _config: &RuleConfig,
        ) -> Result<EngineReport, EngineError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_scan_success_stamps_url_and_time() {
        let report = EngineReport {
            violations: Vec::new(),
            passes: vec![Finding {
                id: "document-title".to_string(),
                ..synthetic_finding()
            }],
            incomplete: Vec::new(),
        };
        let executor = ScanExecutor::new(Arc::new(FixedEngine(report)));

        let result = executor
            .scan("https://example.com/", &RuleConfig::default())
            .await;

        assert_eq!(result.url, "https://example.com/");
        assert_eq!(result.passes.len(), 1);
        assert!(result.violations.is_empty());
        assert!(result.incomplete.is_empty());
    }

    #[tokio::test]
    async fn test_scan_failure_produces_degraded_result() {
        let executor = ScanExecutor::new(Arc::new(FailingEngine));

        let result = executor
            .scan("https://example.com/", &RuleConfig::default())
            .await;

        assert_eq!(result.violations.len(), 1);
        let finding = &result.violations[0];
        assert_eq!(finding.help, SCAN_ERROR_HELP);
        assert!(finding.description.contains("navigation timeout"));
        assert!(finding.nodes.is_empty());
        assert!(result.passes.is_empty());
        assert!(result.incomplete.is_empty());
    }

    #[tokio::test]
    async fn test_scan_and_store_persists_degraded_result() {
        let store: SharedStore =
            Arc::new(Mutex::new(SqliteStore::new_in_memory().unwrap()));
        let executor = ScanExecutor::new(Arc::new(FailingEngine));

        let (result, id) = scan_and_store(
            &executor,
            &store,
            "https://example.com/",
            &RuleConfig::default(),
        )
        .await;

        assert!(id.is_some());
        assert_eq!(result.violations[0].help, SCAN_ERROR_HELP);

        let store = store.lock().unwrap();
        let stored = store.get_result_by_id(id.unwrap()).unwrap().unwrap();
        assert_eq!(stored.violations[0].help, SCAN_ERROR_HELP);
    }

    fn synthetic_finding() -> Finding {
        Finding {
            id: String::new(),
            impact: None,
            tags: Vec::new(),
            help: String::new(),
            help_url: String::new(),
            description: String::new(),
            nodes: Vec::new(),
        }
    }
}
