//! What to do with a cached paid tier the provider can no longer confirm.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{EntitlementSnapshot, EntitlementTier};
use crate::domain::foundation::Timestamp;

/// Behaviour once a cached paid snapshot outlives its offline grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Keep honouring the cached tier until its own expiry.
    FailOpen,

    /// Fall back to Free limits after `max_age + offline_grace`.
    #[default]
    FailClosed,
}

/// Refresh threshold plus the offline policy applied on top of lazy expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    /// Snapshots older than this are refreshed before gating.
    pub max_age: Duration,
    pub policy: StalePolicy,
    /// Extra time a paid tier survives past `max_age` with the provider down.
    pub offline_grace: Duration,
}

impl StalenessPolicy {
    pub fn new(max_age: Duration, policy: StalePolicy, offline_grace: Duration) -> Self {
        Self {
            max_age,
            policy,
            offline_grace,
        }
    }

    /// True if the snapshot should be refreshed before it is trusted.
    pub fn needs_refresh(&self, snapshot: &EntitlementSnapshot, now: Timestamp) -> bool {
        snapshot.is_stale_at(now, self.max_age)
    }

    /// The snapshot gating should use at `now`.
    ///
    /// Applies lazy expiry first. Under `FailClosed`, a paid tier whose
    /// snapshot is older than `max_age + offline_grace` is read as `Free`.
    pub fn apply(&self, snapshot: &EntitlementSnapshot, now: Timestamp) -> EntitlementSnapshot {
        let effective = snapshot.effective_at(now);
        if !effective.tier.is_paid() {
            return effective;
        }

        match self.policy {
            StalePolicy::FailOpen => effective,
            StalePolicy::FailClosed => {
                if effective.is_stale_at(now, self.max_age + self.offline_grace) {
                    EntitlementSnapshot {
                        tier: EntitlementTier::Free,
                        ..effective
                    }
                } else {
                    effective
                }
            }
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(1),
            policy: StalePolicy::FailClosed,
            offline_grace: Duration::hours(72),
        }
    }
}
