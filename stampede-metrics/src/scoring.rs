//! Performance scoring and recommendation heuristics

use stampede_core::{AggregatedMetrics, SuccessCriteria};
use tracing::debug;

/// Score a finished run against its success criteria.
///
/// Starts at 100 and applies independent, additive penalties: 30 for a p95
/// breach, 40 for an error-rate breach, 30 for a throughput shortfall. The
/// result is clamped to 0, so it always lands in [0, 100].
pub fn performance_score(criteria: &SuccessCriteria, metrics: &AggregatedMetrics) -> f64 {
    let mut score: f64 = 100.0;

    if metrics.p95_response_time_ms > criteria.max_response_time_p95_ms {
        debug!(
            "p95 {:.1}ms exceeds threshold {:.1}ms",
            metrics.p95_response_time_ms, criteria.max_response_time_p95_ms
        );
        score -= 30.0;
    }

    if metrics.error_rate > criteria.max_error_rate {
        debug!(
            "error rate {:.3} exceeds threshold {:.3}",
            metrics.error_rate, criteria.max_error_rate
        );
        score -= 40.0;
    }

    if metrics.throughput_rps < criteria.min_throughput_rps {
        debug!(
            "throughput {:.1} rps below threshold {:.1} rps",
            metrics.throughput_rps, criteria.min_throughput_rps
        );
        score -= 30.0;
    }

    score.max(0.0)
}

/// Fixed-threshold recommendation heuristics.
///
/// Thresholds are deliberately independent of the plan's success criteria;
/// they flag absolute levels that warrant attention regardless of what the
/// run was scored against. Order is latency, then errors, then throughput.
pub fn generate_recommendations(metrics: &AggregatedMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();

    if metrics.p95_response_time_ms > 2000.0 {
        recommendations.push(
            "High p95 latency detected: add a caching layer in front of hot read paths"
                .to_string(),
        );
        recommendations.push(
            "Review database query plans and add indexes for the slowest endpoints".to_string(),
        );
    }

    if metrics.error_rate > 0.05 {
        recommendations.push(
            "Elevated error rate: add a circuit breaker around failing downstream calls"
                .to_string(),
        );
        recommendations.push(
            "Retry transient failures with exponential backoff and jitter".to_string(),
        );
    }

    if metrics.throughput_rps < 100.0 {
        recommendations.push(
            "Low throughput: scale out horizontally behind a load balancer".to_string(),
        );
        recommendations.push(
            "Profile for contention and raise connection pool and worker limits".to_string(),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metrics(p95: f64, error_rate: f64, throughput: f64) -> AggregatedMetrics {
        AggregatedMetrics {
            p95_response_time_ms: p95,
            error_rate,
            throughput_rps: throughput,
            ..AggregatedMetrics::zeroed(Utc::now(), 0)
        }
    }

    fn criteria() -> SuccessCriteria {
        SuccessCriteria {
            max_response_time_p95_ms: 500.0,
            max_error_rate: 0.05,
            min_throughput_rps: 10.0,
        }
    }

    #[test]
    fn test_perfect_run_scores_100() {
        let score = performance_score(&criteria(), &metrics(100.0, 0.0, 50.0));
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_scenario_d_error_rate_breach_scores_60() {
        // p95 and throughput within bounds, error rate 0.10 > 0.05
        let score = performance_score(&criteria(), &metrics(100.0, 0.10, 50.0));
        assert_eq!(score, 60.0);
    }

    #[test]
    fn test_all_breaches_clamp_to_zero() {
        let score = performance_score(&criteria(), &metrics(9000.0, 0.5, 1.0));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_score_always_in_range() {
        let cases = [
            metrics(0.0, 0.0, 0.0),
            metrics(f64::MAX, 1.0, 0.0),
            metrics(501.0, 0.051, 9.9),
            metrics(499.0, 0.049, 10.1),
        ];
        for m in &cases {
            let score = performance_score(&criteria(), m);
            assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn test_threshold_equality_is_not_a_breach() {
        let score = performance_score(&criteria(), &metrics(500.0, 0.05, 10.0));
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_recommendations_ordering_and_counts() {
        // Everything bad: latency items first, then errors, then throughput
        let recs = generate_recommendations(&metrics(3000.0, 0.10, 5.0));
        assert_eq!(recs.len(), 6);
        assert!(recs[0].contains("latency"));
        assert!(recs[2].contains("error rate"));
        assert!(recs[4].contains("throughput"));
    }

    #[test]
    fn test_recommendations_empty_for_healthy_run() {
        let recs = generate_recommendations(&metrics(150.0, 0.01, 500.0));
        assert!(recs.is_empty());
    }

    #[test]
    fn test_recommendations_single_condition() {
        let recs = generate_recommendations(&metrics(150.0, 0.2, 500.0));
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|r| r.contains("circuit breaker") || r.contains("backoff")));
    }
}
