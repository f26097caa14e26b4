//! Persisted load-test result record

use crate::config::LoadTestConfig;
use crate::metrics::AggregatedMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a stored run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Running => "running",
            TestStatus::Completed => "completed",
            TestStatus::Failed => "failed",
            TestStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Stored record of one load-test run
///
/// Created with status `Running` when the orchestrator starts, updated once
/// at the end of the run. A failed run keeps whatever summary was computed
/// before the failure and carries the failure message in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestResult {
    pub id: Uuid,

    /// Snapshot of the plan the run executed
    pub config: LoadTestConfig,

    pub start_time: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    pub status: TestStatus,

    /// Final aggregated metrics, present once the run completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AggregatedMetrics>,

    /// Human-readable failure message for failed runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// 0-100 composite score against the plan's success criteria
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,

    pub recommendations: Vec<String>,

    pub tags: Vec<String>,
}

impl LoadTestResult {
    /// New record for a run that is about to start
    pub fn started(config: LoadTestConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            start_time: Utc::now(),
            end_time: None,
            status: TestStatus::Running,
            summary: None,
            error: None,
            performance_score: None,
            recommendations: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Mark the run completed with its final summary and score
    pub fn complete(
        &mut self,
        summary: AggregatedMetrics,
        score: f64,
        recommendations: Vec<String>,
    ) {
        self.end_time = Some(Utc::now());
        self.status = TestStatus::Completed;
        self.summary = Some(summary);
        self.performance_score = Some(score);
        self.recommendations = recommendations;
    }

    /// Mark the run failed, keeping any metrics collected so far
    pub fn fail(&mut self, message: impl Into<String>) {
        self.end_time = Some(Utc::now());
        self.status = TestStatus::Failed;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_record() {
        let result = LoadTestResult::started(LoadTestConfig::default());
        assert_eq!(result.status, TestStatus::Running);
        assert!(result.end_time.is_none());
        assert!(result.summary.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_complete_transition() {
        let mut result = LoadTestResult::started(LoadTestConfig::default());
        let summary = AggregatedMetrics::zeroed(Utc::now(), 0);
        result.complete(summary, 100.0, vec!["looks healthy".to_string()]);
        assert_eq!(result.status, TestStatus::Completed);
        assert_eq!(result.performance_score, Some(100.0));
        assert!(result.end_time.is_some());
    }

    #[test]
    fn test_fail_keeps_config_snapshot() {
        let config = LoadTestConfig {
            test_name: "doomed".to_string(),
            ..Default::default()
        };
        let mut result = LoadTestResult::started(config.clone());
        result.fail("worker initialization failed");
        assert_eq!(result.status, TestStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("worker initialization failed"));
        assert_eq!(result.config, config);
    }

    #[test]
    fn test_result_serde_round_trip() {
        let mut result = LoadTestResult::started(LoadTestConfig::default());
        result.complete(AggregatedMetrics::zeroed(Utc::now(), 3), 70.0, vec![]);
        let json = serde_json::to_string(&result).unwrap();
        let restored: LoadTestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, restored);
    }
}
