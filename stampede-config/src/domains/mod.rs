//! Domain-specific configuration modules

pub mod engine;
pub mod http;
pub mod logging;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Stampede configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StampedeConfig {
    /// Orchestration engine configuration
    #[serde(default)]
    pub engine: engine::EngineConfig,

    /// HTTP client pool configuration
    #[serde(default)]
    pub http: http::HttpClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl StampedeConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
