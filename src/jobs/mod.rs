//! Sitemap batch jobs and their progress registry
//!
//! A submitted sitemap scan runs out-of-band while callers poll its
//! progress. Jobs live only in process memory: they are never persisted
//! and do not survive a restart. Per-URL scan failures are absorbed into
//! persisted results by the executor; only sitemap fetch/parse failures
//! are fatal to a job.

use crate::audit::{scan_and_store, RuleConfig, ScanExecutor};
use crate::sitemap;
use crate::storage::{ResultStore, SharedStore};
use crate::url::normalize_url;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// How long a finished job stays queryable after its first terminal read
pub const JOB_RETENTION: Duration = Duration::from_secs(60);

/// Lifecycle of a sitemap job.
///
/// Transitions are strictly `pending → in-progress → {completed | error}`,
/// except that a job which never reaches `in-progress` (sitemap fetch or
/// parse failure) goes straight from `pending` to `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Progress snapshot of one sitemap batch scan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapJob {
    /// Random token, unique within the process lifetime
    pub id: String,

    pub status: JobStatus,

    /// Number of target URLs; 0 until the sitemap has been fetched
    pub total: usize,

    /// Targets scanned so far; never decreases, never exceeds `total`
    pub completed: usize,

    /// Last URL handed to the scan executor (observational only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,

    /// Failure message, set only when `status == error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether the post-terminal eviction timer has been started
    #[serde(skip)]
    cleanup_scheduled: bool,
}

impl SitemapJob {
    fn new(id: String) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            total: 0,
            completed: 0,
            current_url: None,
            error: None,
            cleanup_scheduled: false,
        }
    }
}

/// In-memory registry of sitemap batch jobs.
///
/// Cheap to clone; all clones share the registry. Batch execution is
/// strictly sequential within a job (one scan/persist cycle at a time),
/// but independent jobs run concurrently with each other and with
/// scheduled sweeps.
#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<Mutex<HashMap<String, SitemapJob>>>,
    executor: ScanExecutor,
    store: SharedStore,
    client: reqwest::Client,
    retention: Duration,
}

impl JobTracker {
    pub fn new(executor: ScanExecutor, store: SharedStore, client: reqwest::Client) -> Self {
        Self::with_retention(executor, store, client, JOB_RETENTION)
    }

    /// Like [`JobTracker::new`] with a custom post-terminal retention
    pub fn with_retention(
        executor: ScanExecutor,
        store: SharedStore,
        client: reqwest::Client,
        retention: Duration,
    ) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            executor,
            store,
            client,
            retention,
        }
    }

    /// Submits a sitemap scan and returns its job id immediately.
    ///
    /// The returned job is in `pending` state; fetching the sitemap and
    /// scanning its targets happen on a spawned task.
    pub fn submit(&self, sitemap_url: &str) -> String {
        let job_id = Uuid::new_v4().to_string();

        self.jobs
            .lock()
            .unwrap()
            .insert(job_id.clone(), SitemapJob::new(job_id.clone()));

        tracing::info!(job_id = %job_id, sitemap_url, "Sitemap scan submitted");

        let tracker = self.clone();
        let id = job_id.clone();
        let sitemap_url = sitemap_url.to_string();
        tokio::spawn(async move {
            tracker.run_job(&id, &sitemap_url).await;
        });

        job_id
    }

    /// Returns a snapshot of the job, or None when the id is unknown or
    /// the job has been evicted.
    ///
    /// The first read that observes a terminal state starts the eviction
    /// timer; the job stays queryable for the retention window after that.
    pub fn get_status(&self, job_id: &str) -> Option<SitemapJob> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(job_id)?;

        if job.status.is_terminal() && !job.cleanup_scheduled {
            job.cleanup_scheduled = true;
            self.schedule_eviction(job_id.to_string());
        }

        Some(job.clone())
    }

    async fn run_job(&self, job_id: &str, sitemap_url: &str) {
        let targets = match sitemap::fetch_sitemap(&self.client, sitemap_url).await {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!(job_id, error = %e, "Sitemap scan failed before starting");
                self.update_job(job_id, |job| {
                    job.status = JobStatus::Error;
                    job.error = Some(e.to_string());
                });
                return;
            }
        };

        // Each target is scanned with the process-wide default rule config
        let config = self.default_config();

        let total = targets.len();
        self.update_job(job_id, |job| {
            job.total = total;
            job.status = JobStatus::InProgress;
        });
        tracing::info!(job_id, total, "Sitemap scan started");

        for target in targets {
            let canonical = normalize_url(&target);
            self.update_job(job_id, |job| {
                job.current_url = Some(canonical.clone());
            });

            // Sequential by design: one scan/persist cycle finishes before
            // the next begins, bounding engine sessions to one per job
            scan_and_store(&self.executor, &self.store, &canonical, &config).await;

            self.update_job(job_id, |job| {
                job.completed += 1;
            });
        }

        self.update_job(job_id, |job| {
            job.status = JobStatus::Completed;
        });
        tracing::info!(job_id, total, "Sitemap scan completed");
    }

    fn default_config(&self) -> RuleConfig {
        let loaded = self.store.lock().unwrap().get_default_rule_config();
        loaded.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load default rule config, using engine defaults");
            RuleConfig::default()
        })
    }

    fn update_job(&self, job_id: &str, apply: impl FnOnce(&mut SitemapJob)) {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(job_id) {
            apply(job);
        }
    }

    fn schedule_eviction(&self, job_id: String) {
        let jobs = Arc::clone(&self.jobs);
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            jobs.lock().unwrap().remove(&job_id);
            tracing::debug!(job_id = %job_id, "Evicted finished sitemap job");
        });
    }
}
