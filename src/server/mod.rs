//! HTTP API surface
//!
//! A thin axum layer over the executor, job tracker, scheduler, and
//! result store. Handlers stay small: canonicalize input, call into the
//! domain, map storage outcomes to status codes.

mod error;
mod handlers;

pub use error::{ApiError, ApiResult};

use crate::audit::ScanExecutor;
use crate::jobs::JobTracker;
use crate::scheduler::SchedulerController;
use crate::storage::SharedStore;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
pub struct AppState {
    pub store: SharedStore,
    pub executor: ScanExecutor,
    pub tracker: JobTracker,
    pub scheduler: SchedulerController,
}

/// Builds the API router with tracing and permissive CORS
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/results",
            get(handlers::list_results).post(handlers::create_result),
        )
        .route("/results/{id}", get(handlers::get_result))
        .route("/scans", post(handlers::run_scan))
        .route("/scans/sitemap", post(handlers::submit_sitemap_scan))
        .route(
            "/scans/sitemap/{job_id}/status",
            get(handlers::get_sitemap_job_status),
        )
        .route(
            "/scheduled-targets",
            get(handlers::list_scheduled_targets).post(handlers::create_scheduled_target),
        )
        .route(
            "/scheduled-targets/{id}",
            delete(handlers::delete_scheduled_target),
        )
        .route(
            "/scheduled-targets/{id}/config",
            post(handlers::update_scheduled_target_config),
        )
        .route(
            "/scheduler-settings",
            get(handlers::get_scheduler_settings).post(handlers::update_scheduler_settings),
        )
        .route(
            "/rule-config",
            get(handlers::get_rule_config).post(handlers::update_rule_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
