//! Storage error types

use thiserror::Error;

/// Common storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Result not found: {id}")]
    NotFound { id: String },

    #[error("Internal storage error: {message}")]
    Internal { message: String },
}
