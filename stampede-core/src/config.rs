//! Load-test plan types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of load test being run
///
/// The engine itself treats every kind the same way; the variant is carried
/// through to the stored result so reporting can distinguish runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    #[default]
    Stress,
    Spike,
    Volume,
    Endurance,
    Breakpoint,
    Soak,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestType::Stress => "stress",
            TestType::Spike => "spike",
            TestType::Volume => "volume",
            TestType::Endurance => "endurance",
            TestType::Breakpoint => "breakpoint",
            TestType::Soak => "soak",
        };
        write!(f, "{}", s)
    }
}

/// Thresholds a run is scored against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessCriteria {
    /// Maximum acceptable p95 response time in milliseconds
    pub max_response_time_p95_ms: f64,

    /// Maximum acceptable error rate (0.0 - 1.0)
    pub max_error_rate: f64,

    /// Minimum acceptable throughput in requests per second
    pub min_throughput_rps: f64,
}

impl Default for SuccessCriteria {
    fn default() -> Self {
        Self {
            max_response_time_p95_ms: 500.0,
            max_error_rate: 0.05,
            min_throughput_rps: 10.0,
        }
    }
}

/// Complete description of one load-test run
///
/// Immutable once a run starts; the orchestrator clones it into the stored
/// result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestConfig {
    /// Human-readable test name
    pub test_name: String,

    /// Kind of test (stress, spike, ...)
    pub test_type: TestType,

    /// Target endpoint, http or https
    pub target_url: String,

    /// HTTP method, e.g. "GET" or "POST"
    pub method: String,

    /// Extra request headers
    pub headers: HashMap<String, String>,

    /// Optional structured request body, sent as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,

    /// Total run duration including ramp phases
    pub duration_seconds: u64,

    /// Peak number of concurrent virtual users
    pub max_users: u32,

    /// Time over which users are progressively started
    pub ramp_up_seconds: u64,

    /// Time allowed for sessions to unwind at the end
    pub ramp_down_seconds: u64,

    /// Idle delay between consecutive requests of one user
    pub think_time_seconds: f64,

    /// Per-request timeout override; pool default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,

    /// Thresholds used for scoring
    pub success_criteria: SuccessCriteria,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            test_name: "load-test".to_string(),
            test_type: TestType::default(),
            target_url: String::new(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            payload: None,
            duration_seconds: 60,
            max_users: 10,
            ramp_up_seconds: 10,
            ramp_down_seconds: 5,
            think_time_seconds: 1.0,
            request_timeout_seconds: None,
            success_criteria: SuccessCriteria::default(),
        }
    }
}

impl LoadTestConfig {
    /// Steady-state duration between ramp-up and ramp-down.
    ///
    /// A plan whose ramp phases exceed the total duration yields zero, not an
    /// error.
    pub fn steady_state_seconds(&self) -> u64 {
        self.duration_seconds
            .saturating_sub(self.ramp_up_seconds)
            .saturating_sub(self.ramp_down_seconds)
    }

    /// Delay between consecutive virtual-user spawns during ramp-up
    pub fn spawn_interval_seconds(&self) -> f64 {
        if self.max_users == 0 {
            return 0.0;
        }
        self.ramp_up_seconds as f64 / self.max_users as f64
    }

    /// Reject plans that cannot possibly run.
    ///
    /// Deliberately minimal: scheduling edge cases such as zero users or
    /// ramp phases longer than the total duration are no-ops at run time,
    /// not validation errors.
    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        if self.target_url.is_empty() {
            return Err(crate::error::CoreError::InvalidPlan(
                "target_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
