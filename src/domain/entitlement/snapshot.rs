//! Entitlement snapshot and the provider status it is built from.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::EntitlementTier;
use crate::domain::foundation::{StateMachine, Timestamp};

/// Entitlement state as reported by the provider, before it is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementStatus {
    pub tier: EntitlementTier,
    /// None means lifetime (or not applicable for Free).
    pub expires_at: Option<Timestamp>,
    pub will_renew: bool,
    /// Sandbox receipts or a mock provider.
    pub is_sandbox_or_mock: bool,
    /// Product that granted the entitlement, if any.
    pub product_id: Option<String>,
}

impl EntitlementStatus {
    /// A plain free-tier status.
    pub fn free() -> Self {
        Self {
            tier: EntitlementTier::Free,
            expires_at: None,
            will_renew: false,
            is_sandbox_or_mock: false,
            product_id: None,
        }
    }

    /// A premium status for `product_id` ending at `expires_at`.
    pub fn premium(product_id: impl Into<String>, expires_at: Option<Timestamp>) -> Self {
        Self {
            tier: EntitlementTier::Premium,
            expires_at,
            will_renew: true,
            is_sandbox_or_mock: false,
            product_id: Some(product_id.into()),
        }
    }

    /// A trial status ending at `expires_at`.
    pub fn trial(product_id: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            tier: EntitlementTier::Trial,
            expires_at: Some(expires_at),
            will_renew: true,
            is_sandbox_or_mock: false,
            product_id: Some(product_id.into()),
        }
    }

    /// Marks the status as coming from a sandbox or mock environment.
    pub fn sandbox(mut self) -> Self {
        self.is_sandbox_or_mock = true;
        self
    }
}

/// Last-known entitlement for the user.
///
/// Invariant: a persisted `Premium` (or `Trial`) snapshot has no expiry or an
/// expiry after `fetched_at`. `from_status` enforces it by normalizing already
/// lapsed statuses to `Expired`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    pub tier: EntitlementTier,
    pub expires_at: Option<Timestamp>,
    pub will_renew: bool,
    /// When the snapshot was obtained. None for the never-fetched default.
    pub fetched_at: Option<Timestamp>,
    pub is_sandbox_or_mock: bool,
    #[serde(default)]
    pub product_id: Option<String>,
    /// Set once the user has held Premium; survives later downgrades.
    #[serde(default)]
    pub ever_premium: bool,
}

impl EntitlementSnapshot {
    /// Default snapshot before any fetch, or after logout.
    pub fn unknown() -> Self {
        Self {
            tier: EntitlementTier::Unknown,
            expires_at: None,
            will_renew: false,
            fetched_at: None,
            is_sandbox_or_mock: false,
            product_id: None,
            ever_premium: false,
        }
    }

    /// Stamps a provider status with its fetch time.
    pub fn from_status(status: EntitlementStatus, fetched_at: Timestamp) -> Self {
        let snapshot = Self {
            ever_premium: status.tier == EntitlementTier::Premium,
            tier: status.tier,
            expires_at: status.expires_at,
            will_renew: status.will_renew,
            fetched_at: Some(fetched_at),
            is_sandbox_or_mock: status.is_sandbox_or_mock,
            product_id: status.product_id,
        };
        snapshot.effective_at(fetched_at)
    }

    /// True if the user holds or has held Premium.
    pub fn has_held_premium(&self) -> bool {
        self.ever_premium || self.tier == EntitlementTier::Premium
    }

    /// Whether `next` may replace this snapshot.
    ///
    /// Follows the tier state machine, and refuses a trial to anyone who has
    /// held Premium, even after a hop through Free.
    pub fn can_become(&self, next: &EntitlementSnapshot) -> bool {
        if !self.tier.can_transition_to(&next.tier) {
            return false;
        }
        let starts_trial =
            next.tier == EntitlementTier::Trial && self.tier != EntitlementTier::Trial;
        !(starts_trial && self.has_held_premium())
    }

    /// `next` with this snapshot's premium history carried forward.
    pub fn superseded_by(&self, next: EntitlementSnapshot) -> EntitlementSnapshot {
        EntitlementSnapshot {
            ever_premium: self.has_held_premium() || next.has_held_premium(),
            ..next
        }
    }

    /// The same entitlement, confirmed again at `now`.
    pub fn restamped(&self, now: Timestamp) -> Self {
        Self {
            fetched_at: Some(now),
            ..self.clone()
        }
    }

    /// True if a paid tier's expiry is at or before `now`.
    pub fn has_lapsed_at(&self, now: Timestamp) -> bool {
        self.tier.is_paid()
            && self
                .expires_at
                .map(|expires_at| !expires_at.is_after(&now))
                .unwrap_or(false)
    }

    /// The snapshot as it stands at `now`, with lazy expiry applied.
    pub fn effective_at(&self, now: Timestamp) -> Self {
        if self.has_lapsed_at(now) {
            Self {
                tier: EntitlementTier::Expired,
                will_renew: false,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// Time since the snapshot was fetched. None if it never was.
    pub fn age_at(&self, now: Timestamp) -> Option<Duration> {
        self.fetched_at.map(|fetched_at| now.duration_since(&fetched_at))
    }

    /// True if the snapshot is older than `max_age`, or was never fetched.
    pub fn is_stale_at(&self, now: Timestamp, max_age: Duration) -> bool {
        self.age_at(now).map(|age| age > max_age).unwrap_or(true)
    }
}

impl Default for EntitlementSnapshot {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> Timestamp {
        Timestamp::from_unix_secs(1_717_200_000)
    }

    #[test]
    fn default_snapshot_is_unknown_and_stale() {
        let snapshot = EntitlementSnapshot::default();
        assert_eq!(snapshot.tier, EntitlementTier::Unknown);
        assert!(snapshot.is_stale_at(t0(), Duration::days(365)));
    }

    #[test]
    fn premium_with_past_expiry_reads_as_expired() {
        let now = t0();
        let snapshot = EntitlementSnapshot::from_status(
            EntitlementStatus::premium("premium_monthly", Some(now.add_days(30))),
            now,
        );

        let later = now.add_days(31);
        assert_eq!(snapshot.effective_at(later).tier, EntitlementTier::Expired);
        assert_eq!(snapshot.effective_at(now).tier, EntitlementTier::Premium);
    }

    #[test]
    fn expiry_at_exact_instant_counts_as_lapsed() {
        let now = t0();
        let snapshot = EntitlementSnapshot::from_status(
            EntitlementStatus::trial("trial", now.add_days(7)),
            now,
        );
        assert!(snapshot.has_lapsed_at(now.add_days(7)));
    }

    #[test]
    fn lifetime_premium_never_lapses() {
        let now = t0();
        let snapshot =
            EntitlementSnapshot::from_status(EntitlementStatus::premium("lifetime", None), now);
        assert_eq!(
            snapshot.effective_at(now.add_days(10_000)).tier,
            EntitlementTier::Premium
        );
    }

    #[test]
    fn lapsed_status_is_normalized_on_ingest() {
        let now = t0();
        let snapshot = EntitlementSnapshot::from_status(
            EntitlementStatus::premium("premium_monthly", Some(now.minus_days(1))),
            now,
        );
        assert_eq!(snapshot.tier, EntitlementTier::Expired);
        assert!(!snapshot.will_renew);
    }

    #[test]
    fn free_tier_ignores_expiry() {
        let now = t0();
        let mut status = EntitlementStatus::free();
        status.expires_at = Some(now.minus_days(3));
        let snapshot = EntitlementSnapshot::from_status(status, now);
        assert_eq!(snapshot.tier, EntitlementTier::Free);
    }

    #[test]
    fn staleness_uses_fetch_time() {
        let now = t0();
        let snapshot = EntitlementSnapshot::from_status(EntitlementStatus::free(), now);

        assert!(!snapshot.is_stale_at(now.plus_secs(60), Duration::minutes(5)));
        assert!(snapshot.is_stale_at(now.plus_secs(301), Duration::minutes(5)));
    }

    #[test]
    fn trial_is_refused_after_premium_even_via_free() {
        let now = t0();
        let premium =
            EntitlementSnapshot::from_status(EntitlementStatus::premium("premium_monthly", None), now);
        let free = premium.superseded_by(EntitlementSnapshot::from_status(
            EntitlementStatus::free(),
            now.add_days(40),
        ));
        let trial = EntitlementSnapshot::from_status(
            EntitlementStatus::trial("premium_monthly", now.add_days(47)),
            now.add_days(40),
        );

        assert_eq!(free.tier, EntitlementTier::Free);
        assert!(free.ever_premium);
        assert!(!free.can_become(&trial));
        assert!(!premium.can_become(&trial));
    }

    #[test]
    fn trial_is_offered_to_never_paid_users() {
        let now = t0();
        let free = EntitlementSnapshot::from_status(EntitlementStatus::free(), now);
        let trial = EntitlementSnapshot::from_status(
            EntitlementStatus::trial("premium_monthly", now.add_days(7)),
            now,
        );

        assert!(free.can_become(&trial));
        assert!(trial.can_become(&trial));
    }

    #[test]
    fn legacy_snapshot_without_history_deserializes() {
        let json = r#"{"tier":"free","expires_at":null,"will_renew":false,"fetched_at":null,"is_sandbox_or_mock":false}"#;
        let snapshot: EntitlementSnapshot = serde_json::from_str(json).unwrap();
        assert!(!snapshot.ever_premium);
        assert_eq!(snapshot.product_id, None);
    }

    #[test]
    fn snapshot_roundtrips_through_json() {
        let now = t0();
        let snapshot = EntitlementSnapshot::from_status(
            EntitlementStatus::premium("premium_annual", Some(now.add_days(365))).sandbox(),
            now,
        );
        let json = serde_json::to_vec(&snapshot).unwrap();
        let back: EntitlementSnapshot = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
