//! Entitlement freshness configuration

use chrono::Duration;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::entitlement::{StalePolicy, StalenessPolicy};

const MAX_OFFLINE_GRACE_SECS: u64 = 30 * 24 * 3600;
const MAX_AGE_CEILING_SECS: u64 = 7 * 24 * 3600;

/// How long a cached entitlement is trusted
#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementConfig {
    /// Refresh the snapshot once it is older than this
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// `fail_open` or `fail_closed`
    #[serde(default)]
    pub stale_policy: StalePolicy,

    /// Extra time a paid tier survives past `max_age_secs` while offline
    #[serde(default = "default_offline_grace")]
    pub offline_grace_secs: u64,
}

impl EntitlementConfig {
    pub fn staleness_policy(&self) -> StalenessPolicy {
        StalenessPolicy::new(
            secs(self.max_age_secs),
            self.stale_policy,
            secs(self.offline_grace_secs),
        )
    }

    /// Validate entitlement configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_age_secs == 0 || self.max_age_secs > MAX_AGE_CEILING_SECS {
            return Err(ValidationError::InvalidMaxAge);
        }
        if self.offline_grace_secs > MAX_OFFLINE_GRACE_SECS {
            return Err(ValidationError::GraceTooLong);
        }
        Ok(())
    }
}

/// Out-of-range values collapse to zero; `validate` rejects them first.
fn secs(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(Duration::zero)
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age(),
            stale_policy: StalePolicy::default(),
            offline_grace_secs: default_offline_grace(),
        }
    }
}

fn default_max_age() -> u64 {
    3600
}

fn default_offline_grace() -> u64 {
    72 * 3600
}
