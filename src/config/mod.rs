//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `RECIPE_GATE` prefix
//! and nested values are separated by double underscores. Every section has
//! defaults, so an empty environment yields a working configuration.
//!
//! # Example
//!
//! ```no_run
//! use recipe_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Counters stored in {}", config.storage.data_dir.display());
//! ```

mod entitlement;
mod error;
mod purchase;
mod quota;
mod storage;
mod telemetry;

pub use entitlement::EntitlementConfig;
pub use error::{ConfigError, ValidationError};
pub use purchase::PurchaseConfig;
pub use quota::QuotaConfig;
pub use storage::StorageConfig;
pub use telemetry::{Environment, TelemetryConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Logging (environment, filter directive)
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Durable store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Free-tier daily limits and day boundary
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Snapshot freshness and offline policy
    #[serde(default)]
    pub entitlement: EntitlementConfig,

    /// Purchase/restore watchdog
    #[serde(default)]
    pub purchase: PurchaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `RECIPE_GATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `RECIPE_GATE__QUOTA__RECIPE_VIEW_LIMIT=10` -> `quota.recipe_view_limit = 10`
    /// - `RECIPE_GATE__ENTITLEMENT__STALE_POLICY=fail_open` -> `entitlement.stale_policy`
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
                    .prefix("RECIPE_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.telemetry.validate()?;
        self.storage.validate()?;
        self.quota.validate()?;
        self.entitlement.validate()?;
        self.purchase.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.telemetry.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::StalePolicy;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "RECIPE_GATE__QUOTA__RECIPE_VIEW_LIMIT",
        "RECIPE_GATE__QUOTA__UTC_OFFSET_MINUTES",
        "RECIPE_GATE__ENTITLEMENT__STALE_POLICY",
        "RECIPE_GATE__PURCHASE__TRANSACTION_TIMEOUT_SECS",
        "RECIPE_GATE__TELEMETRY__ENVIRONMENT",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.quota.recipe_view_limit, 10);
        assert_eq!(config.purchase.transaction_timeout_secs, 30);
        assert_eq!(config.entitlement.stale_policy, StalePolicy::FailClosed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("RECIPE_GATE__QUOTA__RECIPE_VIEW_LIMIT", "25");
        env::set_var("RECIPE_GATE__QUOTA__UTC_OFFSET_MINUTES", "-300");
        env::set_var("RECIPE_GATE__ENTITLEMENT__STALE_POLICY", "fail_open");
        env::set_var("RECIPE_GATE__PURCHASE__TRANSACTION_TIMEOUT_SECS", "45");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.quota.recipe_view_limit, 25);
        assert_eq!(config.quota.utc_offset_minutes, -300);
        assert_eq!(config.entitlement.stale_policy, StalePolicy::FailOpen);
        assert_eq!(config.purchase.transaction_timeout_secs, 45);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("RECIPE_GATE__TELEMETRY__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_validate_reports_first_bad_section() {
        let mut config = AppConfig::default();
        config.purchase.transaction_timeout_secs = 0;
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTransactionTimeout)
        );
    }
}
