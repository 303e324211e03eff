//! a11y-beacon main entry point
//!
//! This is the command-line interface for the a11y-beacon audit service.

use a11y_beacon::audit::{HttpAuditEngine, ScanExecutor};
use a11y_beacon::config::load_config_or_default;
use a11y_beacon::jobs::JobTracker;
use a11y_beacon::scheduler::SchedulerController;
use a11y_beacon::server::{build_router, AppState};
use a11y_beacon::storage::{SharedStore, SqliteStore};
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// a11y-beacon: accessibility scan orchestration service
///
/// Serves an HTTP API for running accessibility scans against URLs and whole
/// sitemaps, storing the reports, and sweeping a list of scheduled targets
/// on a cron cadence.
#[derive(Parser, Debug)]
#[command(name = "a11y-beacon")]
#[command(version = "1.0.0")]
#[command(about = "Accessibility scan orchestration service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let store: SharedStore = Arc::new(Mutex::new(SqliteStore::new(Path::new(
        &config.storage.database_path,
    ))?));
    tracing::info!("Database ready at: {}", config.storage.database_path);

    let engine = HttpAuditEngine::new(
        &config.engine.endpoint,
        Some(Duration::from_secs(config.engine.request_timeout_secs)),
    )?;
    let executor = ScanExecutor::new(Arc::new(engine));

    let tracker = JobTracker::new(
        executor.clone(),
        Arc::clone(&store),
        reqwest::Client::new(),
    );

    let scheduler = SchedulerController::new(executor.clone(), Arc::clone(&store));
    scheduler.reconfigure();

    let state = Arc::new(AppState {
        store,
        executor,
        tracker,
        scheduler,
    });

    let addr: SocketAddr = config.server.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("a11y_beacon=info,warn"),
            1 => EnvFilter::new("a11y_beacon=debug,info,tower_http=debug"),
            2 => EnvFilter::new("a11y_beacon=trace,debug,tower_http=debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
