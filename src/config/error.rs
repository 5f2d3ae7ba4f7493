//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("invalid log level/filter '{value}': {message}")]
    InvalidLogFilter { value: String, message: String },

    #[error("tracing subscriber already installed: {0}")]
    SubscriberInit(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Protocol reload interval must be positive")]
    InvalidReloadInterval,

    #[error("Log level must not be empty")]
    EmptyLogLevel,
}
