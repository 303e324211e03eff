//! Accessibility audit model and scan execution
//!
//! Defines the report data model shared across the service (results,
//! findings, rule configuration), the [`AuditEngine`] seam to the external
//! analysis engine, and the [`ScanExecutor`] wrapper that turns every
//! engine invocation into a well-formed [`ScanResult`].

mod engine;
mod executor;

pub use engine::{AuditEngine, EngineError, EngineReport, HttpAuditEngine};
pub use executor::{scan_and_store, ScanExecutor};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one accessibility scan of one URL.
///
/// Created by the [`ScanExecutor`] (for both successful and failed scans)
/// and immutable thereafter. The wire format follows the axe-core report
/// shape, so field names serialize in camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Canonical URL identity (post-normalization)
    pub url: String,

    /// Time the scan completed, ISO-8601
    pub timestamp: DateTime<Utc>,

    /// Rule checks that failed
    pub violations: Vec<Finding>,

    /// Rule checks that passed
    pub passes: Vec<Finding>,

    /// Rule checks the engine could not decide
    pub incomplete: Vec<Finding>,
}

/// One rule-check outcome reported by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Engine rule identifier
    #[serde(default)]
    pub id: String,

    /// Severity; absent for passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<Impact>,

    /// Rule category tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Short human-readable summary
    #[serde(default)]
    pub help: String,

    /// Link to rule documentation
    #[serde(default)]
    pub help_url: String,

    /// Longer explanation of the check
    #[serde(default)]
    pub description: String,

    /// Concrete DOM matches, in the engine's report order
    #[serde(default)]
    pub nodes: Vec<FindingNode>,
}

/// One DOM match for a finding.
///
/// Engine reports attach more per-node detail than this core inspects; the
/// extra fields are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingNode {
    /// Source snippet of the matched element
    #[serde(default)]
    pub html: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Severity of a violation or incomplete finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
}

/// User-controlled scan parameters, forwarded verbatim to the engine.
///
/// Each section is optional; an empty config means engine defaults (all
/// checks enabled). `result_types` and `iframes` are pass-through only,
/// this core never filters by them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleConfig {
    /// Mutually exclusive selection of which checks run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_only: Option<RunOnly>,

    /// Per-rule enable/disable overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<BTreeMap<String, RuleToggle>>,

    /// Subset of result groups the caller wants reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_types: Option<Vec<ResultType>>,

    /// Whether the engine descends into embedded frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iframes: Option<bool>,
}

impl RuleConfig {
    /// Returns true when no section is set (engine-default semantics)
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Tag-based or rule-based check selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum RunOnly {
    Tag(Vec<String>),
    Rule(Vec<String>),
}

/// Enable flag for one rule id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleToggle {
    pub enabled: bool,
}

/// Result groups an engine report is partitioned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Violations,
    Passes,
    Incomplete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_config_round_trips_axe_shape() {
        let json = r#"{
            "runOnly": {"type": "tag", "values": ["wcag2a", "wcag2aa"]},
            "rules": {"color-contrast": {"enabled": false}},
            "resultTypes": ["violations", "incomplete"],
            "iframes": true
        }"#;

        let config: RuleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.run_only,
            Some(RunOnly::Tag(vec![
                "wcag2a".to_string(),
                "wcag2aa".to_string()
            ]))
        );
        assert!(!config.rules.as_ref().unwrap()["color-contrast"].enabled);
        assert_eq!(
            config.result_types,
            Some(vec![ResultType::Violations, ResultType::Incomplete])
        );
        assert_eq!(config.iframes, Some(true));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["runOnly"]["type"], "tag");
        assert_eq!(value["resultTypes"][0], "violations");
    }

    #[test]
    fn test_rule_config_empty_object_is_default() {
        let config: RuleConfig = serde_json::from_str("{}").unwrap();
        assert!(config.is_empty());
        assert_eq!(serde_json::to_value(&config).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_rule_config_rejects_unknown_sections() {
        let result = serde_json::from_str::<RuleConfig>(r#"{"bogus": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_only_rule_variant() {
        let config: RuleConfig =
            serde_json::from_str(r#"{"runOnly": {"type": "rule", "values": ["image-alt"]}}"#)
                .unwrap();
        assert_eq!(
            config.run_only,
            Some(RunOnly::Rule(vec!["image-alt".to_string()]))
        );
    }

    #[test]
    fn test_finding_node_preserves_extra_fields() {
        let json = r#"{"html": "<img src=\"x\">", "target": ["img"], "failureSummary": "Fix this"}"#;
        let node: FindingNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.html, "<img src=\"x\">");
        assert_eq!(node.extra["target"][0], "img");

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["failureSummary"], "Fix this");
    }

    #[test]
    fn test_impact_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Impact::Critical).unwrap(),
            "\"critical\""
        );
    }
}
