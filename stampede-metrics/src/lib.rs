//! Metric aggregation and run scoring
//!
//! Pure functions only: given a slice of per-request metrics this crate
//! produces windowed or final [`AggregatedMetrics`], and given a final
//! summary plus success criteria it produces a 0-100 performance score and
//! textual recommendations. No state, no IO.

pub mod aggregate;
pub mod scoring;

pub use aggregate::{aggregate_final, aggregate_window, percentile};
pub use scoring::{generate_recommendations, performance_score};
