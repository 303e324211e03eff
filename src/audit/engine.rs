//! Audit engine collaborator
//!
//! The actual accessibility analysis (headless browser, axe-core) lives in
//! an external engine process. This module defines the trait boundary and a
//! reqwest-backed client for an engine exposed over HTTP.

use crate::audit::{Finding, RuleConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by an audit engine invocation.
///
/// Callers inside this crate never propagate these past the scan executor;
/// they are absorbed into a degraded [`crate::audit::ScanResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine request failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Engine returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Engine returned an unreadable report for {url}: {message}")]
    Decode { url: String, message: String },
}

/// Raw report produced by one engine analysis.
///
/// The executor stamps the canonical URL and completion time onto it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineReport {
    #[serde(default)]
    pub violations: Vec<Finding>,
    #[serde(default)]
    pub passes: Vec<Finding>,
    #[serde(default)]
    pub incomplete: Vec<Finding>,
}

/// External accessibility analysis engine.
///
/// One call navigates a page and runs the rule checks with `config` applied
/// verbatim. Implementations own their browser/session resources and must
/// release them on every exit path.
#[async_trait]
pub trait AuditEngine: Send + Sync {
    async fn analyze(&self, url: &str, config: &RuleConfig) -> Result<EngineReport, EngineError>;
}

/// Default request timeout for the engine client.
///
/// Generous because the engine's own navigation timeout governs; this only
/// bounds a hung connection.
const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(120);

/// Audit engine reachable over HTTP.
///
/// Sends `POST {endpoint}/analyze` with `{"url": ..., "config": ...}` and
/// expects an axe-core-shaped JSON report back.
pub struct HttpAuditEngine {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
    config: &'a RuleConfig,
}

impl HttpAuditEngine {
    /// Creates an engine client for the given base endpoint
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_ENGINE_TIMEOUT))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AuditEngine for HttpAuditEngine {
    async fn analyze(&self, url: &str, config: &RuleConfig) -> Result<EngineReport, EngineError> {
        let request_url = format!("{}/analyze", self.endpoint);

        let response = self
            .client
            .post(&request_url)
            .json(&AnalyzeRequest { url, config })
            .send()
            .await
            .map_err(|e| EngineError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<EngineReport>()
            .await
            .map_err(|e| EngineError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}
