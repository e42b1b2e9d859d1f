//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Daily limit for {0} exceeds maximum allowed (10000)")]
    LimitTooLarge(&'static str),

    #[error("UTC offset must be within -23:59..=+23:59")]
    InvalidUtcOffset,

    #[error("Entitlement max age must be between 1 second and 7 days")]
    InvalidMaxAge,

    #[error("Offline grace period exceeds maximum allowed (30 days)")]
    GraceTooLong,

    #[error("Transaction timeout must be between 1 and 300 seconds")]
    InvalidTransactionTimeout,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
