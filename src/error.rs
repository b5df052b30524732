use std::path::PathBuf;
use thiserror::Error;

/// Failures of a timetable sync run, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("timetable page {url} unavailable: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("no download link found under a container with id prefix `{prefix}`")]
    LinkNotFound { prefix: String },

    #[error("download from {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("workbook {} unreadable: {reason}", .path.display())]
    WorkbookUnreadable { path: PathBuf, reason: String },

    #[error("workbook has {found} sheets, expected at least {required} day sheets")]
    MissingDaySheets { found: usize, required: usize },

    #[error("unknown time slot label `{0}`")]
    UnknownTimeSlot(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("a timetable sync is already running")]
    AlreadyRunning,
}

impl SyncError {
    /// Short name of the stage that failed, for callers and log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            SyncError::SourceUnavailable { .. } | SyncError::LinkNotFound { .. } => "resolve",
            SyncError::DownloadFailed { .. } => "download",
            SyncError::WorkbookUnreadable { .. } | SyncError::MissingDaySheets { .. } => "parse",
            SyncError::UnknownTimeSlot(_) => "normalize",
            SyncError::Store(_) => "reconcile",
            SyncError::AlreadyRunning => "lock",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("course {0} not found")]
    CourseNotFound(i64),
}
