//! Stampede core data model
//!
//! This crate provides the type definitions shared by every other Stampede
//! crate: the load-test plan, per-request metrics, aggregated summaries, and
//! the persisted result record. All types serialize with serde so a stored
//! result round-trips losslessly.

pub mod config;
pub mod error;
pub mod metrics;
pub mod result;

// Re-export main types for convenience
pub use config::{LoadTestConfig, SuccessCriteria, TestType};
pub use error::CoreError;
pub use metrics::{AggregatedMetrics, RequestMetrics};
pub use result::{LoadTestResult, TestStatus};
