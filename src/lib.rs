pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod store;
pub mod timetable;

pub use config::Config;
pub use error::{StoreError, SyncError};
pub use pipeline::{Pipeline, SyncSummary};
