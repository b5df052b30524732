use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::{sync::Mutex, task};
use tracing::{info, instrument};

use crate::{
    config::Config,
    error::SyncError,
    fetch::{download_to, resolve_download_url},
    store::{replace_derived_classes, ReconcileSummary},
    timetable::{parse_workbook, SkippedCell},
};

/// Outcome of one successful sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub download_url: String,
    pub bytes: u64,
    pub reconcile: ReconcileSummary,
    pub skipped: Vec<SkippedCell>,
}

/// Timetable sync: page -> spreadsheet -> schedule -> database.
///
/// Only one run may be in flight per `Pipeline`; they share the local
/// spreadsheet path and the derived rows.
pub struct Pipeline {
    config: Config,
    client: Client,
    pool: SqlitePool,
    run_lock: Mutex<()>,
}

impl Pipeline {
    /// Build a pipeline whose HTTP client applies `config.http_timeout` to
    /// every request.
    pub fn new(config: Config, pool: SqlitePool) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(config, pool, client))
    }

    pub fn with_client(config: Config, pool: SqlitePool, client: Client) -> Self {
        Self {
            config,
            client,
            pool,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run the whole sync once.
    ///
    /// Resolving, downloading and parsing all finish before the database is
    /// touched, so a failure in any of them leaves persisted state as it was.
    /// Fails with [`SyncError::AlreadyRunning`] if another run holds the lock.
    #[instrument(level = "info", skip_all, fields(page = %self.config.page_url))]
    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| SyncError::AlreadyRunning)?;
        let started_at = Utc::now();
        let cfg = &self.config;

        let url = resolve_download_url(
            &self.client,
            &cfg.page_url,
            &cfg.container_id_prefix,
            &cfg.download_host,
            cfg.retry,
        )
        .await?;

        let bytes = download_to(&self.client, &url, &cfg.sheet_path, cfg.retry).await?;

        // calamine is blocking; keep it off the async workers
        let sheet_path = cfg.sheet_path.clone();
        let parsed = task::spawn_blocking(move || parse_workbook(&sheet_path))
            .await
            .map_err(|e| SyncError::WorkbookUnreadable {
                path: cfg.sheet_path.clone(),
                reason: format!("parser task failed: {e}"),
            })??;

        let reconcile = replace_derived_classes(&self.pool, &parsed.schedule).await?;

        let summary = SyncSummary {
            started_at,
            finished_at: Utc::now(),
            download_url: url.to_string(),
            bytes,
            reconcile,
            skipped: parsed.skipped,
        };
        info!(
            elapsed_ms = (summary.finished_at - started_at).num_milliseconds(),
            inserted = summary.reconcile.inserted,
            skipped = summary.skipped.len(),
            "timetable sync finished"
        );
        Ok(summary)
    }
}
