//! Stampede orchestration engine
//!
//! Drives a configurable number of virtual users against a target HTTP
//! service through a ramp-up / steady-state / ramp-down schedule. Each
//! virtual user runs as an independently cancellable tokio task owned by a
//! worker; per-request metrics flow through an mpsc channel into a single
//! collector, and the orchestrator aggregates, scores, and persists the
//! outcome.

pub mod error;
pub mod orchestrator;
pub mod worker;

// Re-export main types
pub use error::EngineError;
pub use orchestrator::{LoadTestOrchestrator, ProgressCallback};
pub use worker::{UserContext, VirtualUserWorker};
