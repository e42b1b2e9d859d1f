//! Purchase configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Purchase/restore watchdog
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseConfig {
    /// A transaction still running after this many seconds fails
    #[serde(default = "default_transaction_timeout")]
    pub transaction_timeout_secs: u64,
}

impl PurchaseConfig {
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }

    /// Validate purchase configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.transaction_timeout_secs == 0 || self.transaction_timeout_secs > 300 {
            return Err(ValidationError::InvalidTransactionTimeout);
        }
        Ok(())
    }
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            transaction_timeout_secs: default_transaction_timeout(),
        }
    }
}

fn default_transaction_timeout() -> u64 {
    30
}
