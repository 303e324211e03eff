//! HTTP request handlers
//!
//! All write endpoints accept their body as loose JSON and deserialize it
//! by hand so malformed payloads surface as 400 with a `{error, code}`
//! body rather than the extractor's default rejection.

use crate::audit::{scan_and_store, RuleConfig, ScanResult};
use crate::jobs::SitemapJob;
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::storage::{ResultStore, ResultSummary, ScheduledTarget, SchedulerSettings};
use crate::url::normalize_url;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

fn parse_body<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Extracts and canonicalizes a required `url` field
fn require_url(url: Option<String>) -> ApiResult<String> {
    let raw = url.unwrap_or_default();
    let canonical = normalize_url(&raw);
    if canonical.is_empty() {
        return Err(ApiError::BadRequest("A url is required".to_string()));
    }
    Ok(canonical)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_results(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ResultSummary>>> {
    let summaries = state.store.lock().unwrap().list_result_summaries()?;
    Ok(Json(summaries))
}

pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ScanResult>> {
    let result = state.store.lock().unwrap().get_result_by_id(id)?;
    result
        .map(Json)
        .ok_or(ApiError::NotFound { entity: "Result" })
}

pub async fn create_result(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut result: ScanResult = parse_body(body)?;
    result.url = require_url(Some(result.url))?;

    let id = state.store.lock().unwrap().insert_result(&result)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(serde::Deserialize)]
struct ScanRequest {
    url: Option<String>,
    config: Option<RuleConfig>,
}

/// Runs one scan right now, persists the report, and returns it
pub async fn run_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let request: ScanRequest = parse_body(body)?;
    let url = require_url(request.url)?;

    let config = match request.config {
        Some(config) => config,
        None => state.store.lock().unwrap().get_default_rule_config()?,
    };

    let (result, id) = scan_and_store(&state.executor, &state.store, &url, &config).await;
    Ok(Json(json!({ "id": id, "result": result })))
}

#[derive(serde::Deserialize)]
struct SitemapScanRequest {
    url: Option<String>,
}

pub async fn submit_sitemap_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: SitemapScanRequest = parse_body(body)?;
    let sitemap_url = request
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("A sitemap url is required".to_string()))?;

    let job_id = state.tracker.submit(&sitemap_url);
    Ok((StatusCode::ACCEPTED, Json(json!({ "jobId": job_id }))))
}

pub async fn get_sitemap_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<SitemapJob>> {
    state
        .tracker
        .get_status(&job_id)
        .map(Json)
        .ok_or(ApiError::NotFound { entity: "Job" })
}

pub async fn list_scheduled_targets(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ScheduledTarget>>> {
    let targets = state.store.lock().unwrap().list_scheduled_targets()?;
    Ok(Json(targets))
}

#[derive(serde::Deserialize)]
struct CreateTargetRequest {
    url: Option<String>,
    #[serde(default)]
    config: RuleConfig,
}

pub async fn create_scheduled_target(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<ScheduledTarget>)> {
    let request: CreateTargetRequest = parse_body(body)?;
    let url = require_url(request.url)?;

    let target = state
        .store
        .lock()
        .unwrap()
        .insert_scheduled_target(&url, &request.config)?;
    Ok((StatusCode::CREATED, Json(target)))
}

pub async fn delete_scheduled_target(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state.store.lock().unwrap().delete_scheduled_target(id)?;
    if !deleted {
        return Err(ApiError::NotFound { entity: "Scheduled target" });
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(serde::Deserialize)]
struct UpdateConfigRequest {
    config: RuleConfig,
}

pub async fn update_scheduled_target_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<RuleConfig>> {
    let UpdateConfigRequest { config } = parse_body(body)?;

    let updated = state
        .store
        .lock()
        .unwrap()
        .update_scheduled_target_config(id, &config)?;
    if !updated {
        return Err(ApiError::NotFound { entity: "Scheduled target" });
    }
    Ok(Json(config))
}

pub async fn get_scheduler_settings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SchedulerSettings>> {
    let settings = state.store.lock().unwrap().get_scheduler_settings()?;
    Ok(Json(settings))
}

/// Partially updates the scheduler settings and applies them.
///
/// Fields keep their current value when omitted. A cron expression is
/// stored even when it does not parse; the scheduler then fails closed
/// and the operator sees it in the logs, matching the fail-closed
/// contract rather than rejecting the write.
pub async fn update_scheduler_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<Json<SchedulerSettings>> {
    let Value::Object(fields) = body else {
        return Err(ApiError::BadRequest("Expected a JSON object".to_string()));
    };

    // One lock scope for the whole read-modify-write, so two concurrent
    // partial updates cannot overwrite each other's field
    let settings = {
        let mut store = state.store.lock().unwrap();
        let mut settings = store.get_scheduler_settings()?;

        if let Some(enabled) = fields.get("enabled") {
            settings.enabled = enabled
                .as_bool()
                .ok_or_else(|| ApiError::BadRequest("enabled must be a boolean".to_string()))?;
        }
        if let Some(cron) = fields.get("cron") {
            settings.cron = cron
                .as_str()
                .ok_or_else(|| ApiError::BadRequest("cron must be a string".to_string()))?
                .to_string();
        }

        store.update_scheduler_settings(&settings)?;
        settings
    };

    state.scheduler.reconfigure();

    Ok(Json(settings))
}

pub async fn get_rule_config(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RuleConfig>> {
    let config = state.store.lock().unwrap().get_default_rule_config()?;
    Ok(Json(config))
}

pub async fn update_rule_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult<Json<RuleConfig>> {
    let config: RuleConfig = parse_body(body)?;
    state.store.lock().unwrap().set_default_rule_config(&config)?;
    Ok(Json(config))
}
