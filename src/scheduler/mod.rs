//! Recurring sweeps over the scheduled target list
//!
//! At most one timer task is ever armed. Each firing spawns a detached
//! sweep so a reconfigure can stop the timer without cutting short a
//! sweep already in flight.

mod cron;

pub use cron::{CronError, CronSchedule};

use crate::audit::{scan_and_store, ScanExecutor};
use crate::storage::{ResultStore, SharedStore};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Drives recurring accessibility sweeps from persisted settings.
///
/// Cheap to clone; all clones share the armed-timer slot.
#[derive(Clone)]
pub struct SchedulerController {
    timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    executor: ScanExecutor,
    store: SharedStore,
}

impl SchedulerController {
    pub fn new(executor: ScanExecutor, store: SharedStore) -> Self {
        Self {
            timer: Arc::new(Mutex::new(None)),
            executor,
            store,
        }
    }

    /// Whether a timer task is currently armed
    pub fn is_armed(&self) -> bool {
        self.timer.lock().unwrap().is_some()
    }

    /// Stops the armed timer, if any. Sweeps already in flight run to
    /// completion.
    pub fn stop(&self) {
        if let Some(handle) = self.timer.lock().unwrap().take() {
            handle.abort();
            tracing::info!("Scheduler stopped");
        }
    }

    /// Arms the timer from the persisted scheduler settings.
    ///
    /// Fails closed: when the settings are disabled, unreadable, or carry
    /// a cron expression that does not parse, the scheduler ends up
    /// stopped rather than running on a guessed cadence.
    pub fn start(&self) {
        self.stop();

        let settings = match self.store.lock().unwrap().get_scheduler_settings() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(error = %e, "Could not load scheduler settings, scheduler stays stopped");
                return;
            }
        };

        if !settings.enabled {
            tracing::info!("Scheduler is disabled");
            return;
        }

        let schedule: CronSchedule = match settings.cron.parse() {
            Ok(schedule) => schedule,
            Err(e) => {
                tracing::error!(
                    cron = %settings.cron,
                    error = %e,
                    "Invalid cron expression, scheduler stays stopped"
                );
                return;
            }
        };

        tracing::info!(cron = %settings.cron, "Scheduler started");

        let controller = self.clone();
        let handle = tokio::spawn(async move {
            controller.run_timer(schedule).await;
        });
        // Replace atomically: concurrent starts must not leave a second
        // timer running untracked
        if let Some(old) = self.timer.lock().unwrap().replace(handle) {
            old.abort();
        }
    }

    /// Applies the current persisted settings: stop, then start if enabled
    pub fn reconfigure(&self) {
        self.stop();
        self.start();
    }

    async fn run_timer(&self, schedule: CronSchedule) {
        loop {
            let now = Utc::now();
            let Some(next) = schedule.next_after(now) else {
                tracing::warn!("Cron schedule has no future firing, scheduler going idle");
                return;
            };
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tracing::debug!(next = %next, "Next scheduled sweep");
            tokio::time::sleep(wait).await;

            // Detached: aborting the timer must not kill a running sweep
            let controller = self.clone();
            tokio::spawn(async move {
                controller.run_sweep().await;
            });
        }
    }

    /// Scans every scheduled target sequentially. Never fails: per-target
    /// problems are absorbed into degraded results by the executor, and a
    /// target list that cannot be read just skips the sweep.
    pub async fn run_sweep(&self) {
        let targets = match self.store.lock().unwrap().list_scheduled_targets() {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!(error = %e, "Could not load scheduled targets, skipping sweep");
                return;
            }
        };

        if targets.is_empty() {
            tracing::debug!("No scheduled targets, nothing to sweep");
            return;
        }

        tracing::info!(targets = targets.len(), "Scheduled sweep started");
        for target in &targets {
            scan_and_store(&self.executor, &self.store, &target.url, &target.config).await;
        }
        tracing::info!(targets = targets.len(), "Scheduled sweep finished");
    }
}
