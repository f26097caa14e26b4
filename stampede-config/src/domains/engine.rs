//! Orchestration engine configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Engine-level defaults for load-test runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Region label used for the default worker
    #[serde(default = "default_region")]
    pub default_region: String,

    /// Progress callback cadence: invoke every Nth virtual-user spawn
    #[serde(default = "default_progress_interval")]
    pub progress_every_spawns: u32,

    /// Width of the rolling window used for progress summaries, in seconds
    #[serde(default = "default_progress_window")]
    pub progress_window_seconds: u64,

    /// Back-off after an unexpected session error, in seconds
    #[serde(default = "default_session_backoff")]
    pub session_error_backoff_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            progress_every_spawns: default_progress_interval(),
            progress_window_seconds: default_progress_window(),
            session_error_backoff_seconds: default_session_backoff(),
        }
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.default_region, "default_region", self.domain_name())?;
        validate_positive(
            self.progress_every_spawns as u64,
            "progress_every_spawns",
            self.domain_name(),
        )?;
        validate_positive(
            self.progress_window_seconds,
            "progress_window_seconds",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "engine"
    }
}

fn default_region() -> String {
    "local".to_string()
}

fn default_progress_interval() -> u32 {
    10
}

fn default_progress_window() -> u64 {
    10
}

fn default_session_backoff() -> u64 {
    1
}
