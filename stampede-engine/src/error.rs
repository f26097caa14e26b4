//! Error types for load-test orchestration

use thiserror::Error;

/// Orchestration-level errors
///
/// Per-request transport failures never surface here; they are folded into
/// the collected metrics. These errors cover the run itself: worker
/// initialization, persistence, and task management.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    StorageError(#[from] stampede_storage::StorageError),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] stampede_http::HttpError),

    #[error("Worker error: {0}")]
    WorkerError(String),

    #[error("Task join error: {0}")]
    TaskJoinError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}
