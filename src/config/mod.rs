//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTAKE_TRIAGE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use intake_triage::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Reloading protocols every {:?}", config.escalation.reload_interval());
//! ```

mod error;
mod escalation;
mod logging;

pub use error::{ConfigError, ValidationError};
pub use escalation::EscalationConfig;
pub use logging::{init_tracing, LoggingConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Protocol source and fallback routing
    #[serde(default)]
    pub escalation: EscalationConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTAKE_TRIAGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTAKE_TRIAGE__ESCALATION__PROTOCOL_FILE=./protocols.yaml`
    /// - `INTAKE_TRIAGE__LOGGING__JSON=true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTAKE_TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a zero reload interval, an empty
    /// fallback group or an empty log level.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.escalation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
