//! Stampede configuration
//!
//! Domain-segregated configuration with YAML file loading and
//! `STAMPEDE_*` environment-variable overrides. Each domain validates
//! itself through the [`Validatable`] trait.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

pub use domains::StampedeConfig;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;
