//! Configuration loading and environment variable handling

use crate::domains::StampedeConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "STAMPEDE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<StampedeConfig> {
        debug!("Loading config from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path)?;
        let mut config: StampedeConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<StampedeConfig> {
        let mut config = StampedeConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<StampedeConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut StampedeConfig) -> ConfigResult<()> {
        self.apply_http_overrides(&mut config.http)?;
        self.apply_engine_overrides(&mut config.engine)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpClientConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_TIMEOUT: {}", e)))?;
            config.timeout = std::time::Duration::from_secs(seconds);
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(verify_tls) = self.get_env_var("HTTP_VERIFY_TLS") {
            config.verify_tls = verify_tls
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_VERIFY_TLS: {}", e)))?;
        }

        Ok(())
    }

    /// Apply engine config overrides
    fn apply_engine_overrides(
        &self,
        config: &mut crate::domains::engine::EngineConfig,
    ) -> ConfigResult<()> {
        if let Ok(region) = self.get_env_var("DEFAULT_REGION") {
            config.default_region = region;
        }

        if let Ok(window) = self.get_env_var("PROGRESS_WINDOW_SECONDS") {
            config.progress_window_seconds = window.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid PROGRESS_WINDOW_SECONDS: {}", e))
            })?;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = log_level
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "http:\n  timeout: 5\nengine:\n  default_region: eu-west-1\n"
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let config = loader.from_file(file.path()).unwrap();
        assert_eq!(config.http.timeout.as_secs(), 5);
        assert_eq!(config.engine.default_region, "eu-west-1");
        // Untouched domains keep defaults
        assert_eq!(config.engine.progress_every_spawns, 10);
    }

    #[test]
    fn test_env_override() {
        // Unique prefix keeps this test independent of the process environment
        std::env::set_var("STAMPEDE_TEST_HTTP_TIMEOUT", "7");
        let loader = ConfigLoader::with_prefix("STAMPEDE_TEST");
        let config = loader.from_env().unwrap();
        assert_eq!(config.http.timeout.as_secs(), 7);
        std::env::remove_var("STAMPEDE_TEST_HTTP_TIMEOUT");
    }

    #[test]
    fn test_invalid_env_value() {
        std::env::set_var("STAMPEDE_BAD_HTTP_TIMEOUT", "not-a-number");
        let loader = ConfigLoader::with_prefix("STAMPEDE_BAD");
        assert!(loader.from_env().is_err());
        std::env::remove_var("STAMPEDE_BAD_HTTP_TIMEOUT");
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new();
        assert!(loader.from_file("/nonexistent/stampede.yaml").is_err());
    }
}
