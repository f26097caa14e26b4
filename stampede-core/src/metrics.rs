//! Per-request and aggregated metric types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of one request attempt
///
/// One record is produced per completed attempt, successful or failed.
/// Records are append-only; nothing mutates them after emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Completion time of the attempt
    pub timestamp: DateTime<Utc>,

    /// Wall-clock duration from dispatch to fully-read body (or failure)
    pub response_time_ms: f64,

    /// HTTP status code; 0 means no response was received at all
    pub status_code: u16,

    /// Transport or protocol error message, when the attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Request body bytes sent
    pub bytes_sent: u64,

    /// Response body bytes received
    pub bytes_received: u64,

    /// Worker that executed the attempt
    pub worker_id: String,
}

impl RequestMetrics {
    /// Whether this attempt counts as successful: a real HTTP response with a
    /// non-error status and no transport error.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..400).contains(&self.status_code)
    }

    /// Classification key for the error taxonomy: the error message when one
    /// is present, otherwise `HTTP_<status>`.
    pub fn error_key(&self) -> String {
        match &self.error {
            Some(message) => message.clone(),
            None => format!("HTTP_{}", self.status_code),
        }
    }
}

/// Summary statistics over a set of request metrics
///
/// Derived data, computed over either a rolling window (progress callbacks)
/// or the full buffer (final summary). Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    /// End of the window this summary covers
    pub timestamp: DateTime<Utc>,

    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,

    /// Fraction of failed requests, in [0, 1]
    pub error_rate: f64,

    pub avg_response_time_ms: f64,
    pub p50_response_time_ms: f64,
    pub p95_response_time_ms: f64,
    pub p99_response_time_ms: f64,
    pub min_response_time_ms: f64,
    pub max_response_time_ms: f64,

    /// Completed requests per second over the window
    pub throughput_rps: f64,

    /// Total bytes sent plus received
    pub bytes_transferred: u64,

    /// Virtual users active when the summary was taken
    pub active_users: u32,

    /// Failure counts keyed by error message or `HTTP_<status>`
    pub errors_by_type: HashMap<String, u64>,
}

impl AggregatedMetrics {
    /// All-zero summary for an empty window; only `active_users` is carried.
    pub fn zeroed(timestamp: DateTime<Utc>, active_users: u32) -> Self {
        Self {
            timestamp,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            error_rate: 0.0,
            avg_response_time_ms: 0.0,
            p50_response_time_ms: 0.0,
            p95_response_time_ms: 0.0,
            p99_response_time_ms: 0.0,
            min_response_time_ms: 0.0,
            max_response_time_ms: 0.0,
            throughput_rps: 0.0,
            bytes_transferred: 0,
            active_users,
            errors_by_type: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: u16, error: Option<&str>) -> RequestMetrics {
        RequestMetrics {
            timestamp: Utc::now(),
            response_time_ms: 12.0,
            status_code: status,
            error: error.map(|e| e.to_string()),
            bytes_sent: 0,
            bytes_received: 0,
            worker_id: "worker-local-0".to_string(),
        }
    }

    #[test]
    fn test_success_classification() {
        assert!(sample(200, None).is_success());
        assert!(sample(302, None).is_success());
        assert!(!sample(404, None).is_success());
        assert!(!sample(500, None).is_success());
        assert!(!sample(0, Some("connection refused")).is_success());
        // An error message marks the attempt failed even with a 2xx status
        assert!(!sample(200, Some("body read aborted")).is_success());
    }

    #[test]
    fn test_error_key() {
        assert_eq!(sample(503, None).error_key(), "HTTP_503");
        assert_eq!(
            sample(0, Some("operation timed out")).error_key(),
            "operation timed out"
        );
    }

    #[test]
    fn test_zeroed_preserves_active_users() {
        let zero = AggregatedMetrics::zeroed(Utc::now(), 7);
        assert_eq!(zero.active_users, 7);
        assert_eq!(zero.total_requests, 0);
        assert_eq!(zero.throughput_rps, 0.0);
        assert!(zero.errors_by_type.is_empty());
    }
}
