//! Logging configuration and tracing initialisation

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::error::{ConfigError, ValidationError};

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            return Err(ValidationError::EmptyLogLevel);
        }
        Ok(())
    }

    /// Builds the filter. `RUST_LOG` wins over the configured level.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level).map_err(|e| ConfigError::InvalidLogFilter {
                value: self.level.clone(),
                message: e.to_string(),
            }),
        }
    }
}

/// Installs the global tracing subscriber. Logs go to stderr so stdout
/// stays clean for JSON output.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    result.map_err(|e| ConfigError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info_text() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_level_is_rejected() {
        let config = LoggingConfig {
            level: String::new(),
            json: false,
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyLogLevel));
    }
}
