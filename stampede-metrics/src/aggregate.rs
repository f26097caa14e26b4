//! Windowed and final metric aggregation

use chrono::{DateTime, Utc};
use stampede_core::{AggregatedMetrics, RequestMetrics};
use std::collections::HashMap;
use tracing::debug;

/// Percentile of a sorted sample using linear interpolation between closest
/// ranks: `rank = p/100 * (n-1)`, fractional ranks interpolated between the
/// two neighboring sorted values.
///
/// `sorted` must be ascending; returns 0.0 for an empty sample.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }

    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Summarize the metrics whose timestamps fall inside
/// `[window_start, window_end]`, bounds inclusive.
///
/// An empty window yields an all-zero summary that still carries
/// `active_users`.
pub fn aggregate_window(
    metrics: &[RequestMetrics],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    active_users: u32,
) -> AggregatedMetrics {
    let window: Vec<&RequestMetrics> = metrics
        .iter()
        .filter(|m| m.timestamp >= window_start && m.timestamp <= window_end)
        .collect();

    let window_seconds = (window_end - window_start)
        .num_milliseconds()
        .max(0) as f64
        / 1000.0;

    debug!(
        "Aggregating {} of {} metrics over a {:.1}s window",
        window.len(),
        metrics.len(),
        window_seconds
    );

    summarize(&window, window_end, window_seconds, active_users)
}

/// Summarize the entire buffer for the final report.
///
/// The effective test duration is the span between the first and last
/// collected metric; a zero-length span yields zero throughput rather than a
/// division error.
pub fn aggregate_final(metrics: &[RequestMetrics], active_users: u32) -> AggregatedMetrics {
    let all: Vec<&RequestMetrics> = metrics.iter().collect();

    let duration_seconds = match (
        metrics.iter().map(|m| m.timestamp).min(),
        metrics.iter().map(|m| m.timestamp).max(),
    ) {
        (Some(first), Some(last)) => (last - first).num_milliseconds().max(0) as f64 / 1000.0,
        _ => 0.0,
    };

    summarize(&all, Utc::now(), duration_seconds, active_users)
}

fn summarize(
    window: &[&RequestMetrics],
    timestamp: DateTime<Utc>,
    duration_seconds: f64,
    active_users: u32,
) -> AggregatedMetrics {
    if window.is_empty() {
        return AggregatedMetrics::zeroed(timestamp, active_users);
    }

    let total = window.len() as u64;
    let successful = window.iter().filter(|m| m.is_success()).count() as u64;
    let failed = total - successful;

    let mut times: Vec<f64> = window.iter().map(|m| m.response_time_ms).collect();
    times.sort_by(|a, b| a.total_cmp(b));

    let mut errors_by_type: HashMap<String, u64> = HashMap::new();
    for m in window.iter().filter(|m| !m.is_success()) {
        *errors_by_type.entry(m.error_key()).or_insert(0) += 1;
    }

    let throughput_rps = if duration_seconds > 0.0 {
        total as f64 / duration_seconds
    } else {
        0.0
    };

    AggregatedMetrics {
        timestamp,
        total_requests: total,
        successful_requests: successful,
        failed_requests: failed,
        error_rate: failed as f64 / total as f64,
        avg_response_time_ms: times.iter().sum::<f64>() / times.len() as f64,
        p50_response_time_ms: percentile(&times, 50.0),
        p95_response_time_ms: percentile(&times, 95.0),
        p99_response_time_ms: percentile(&times, 99.0),
        min_response_time_ms: times[0],
        max_response_time_ms: times[times.len() - 1],
        throughput_rps,
        bytes_transferred: window.iter().map(|m| m.bytes_sent + m.bytes_received).sum(),
        active_users,
        errors_by_type,
    }
}
