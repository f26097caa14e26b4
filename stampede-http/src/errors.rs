//! HTTP error types

use crate::types::HttpMethodError;

/// Error type for HTTP client construction and configuration
///
/// Per-request transport failures never use this type; they are captured in
/// the request outcome instead.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),
}
