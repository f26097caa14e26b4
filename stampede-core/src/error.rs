//! Core error types

use thiserror::Error;

/// Errors shared across Stampede crates
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid test plan: {0}")]
    InvalidPlan(String),
}
