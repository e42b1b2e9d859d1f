//! Entitlement tier definitions.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Subscription tier the user currently holds.
///
/// Determines which daily allowances apply. `Unknown` is the state before the
/// first successful provider fetch and after logout; it gates exactly like
/// `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementTier {
    /// No subscription. Daily limits apply.
    Free,

    /// Introductory trial. Unlimited while unexpired.
    Trial,

    /// Paid subscription. Unlimited while unexpired.
    Premium,

    /// Trial or subscription whose expiry passed without renewal.
    Expired,

    /// Never fetched, or reset by logout.
    Unknown,
}

impl EntitlementTier {
    /// Returns true if this tier lifts daily limits.
    pub fn is_paid(&self) -> bool {
        matches!(self, EntitlementTier::Premium | EntitlementTier::Trial)
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntitlementTier::Free => "Free",
            EntitlementTier::Trial => "Trial",
            EntitlementTier::Premium => "Premium",
            EntitlementTier::Expired => "Expired",
            EntitlementTier::Unknown => "Unknown",
        }
    }
}

impl Default for EntitlementTier {
    fn default() -> Self {
        EntitlementTier::Unknown
    }
}

impl std::fmt::Display for EntitlementTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl StateMachine for EntitlementTier {
    fn can_transition_to(&self, target: &Self) -> bool {
        use EntitlementTier::*;
        matches!(
            (self, target),
            // First successful fetch
            (Unknown, Free)
                | (Unknown, Trial)
                | (Unknown, Premium)
                | (Unknown, Expired)
            // From FREE
                | (Free, Free)
                | (Free, Trial)
                | (Free, Premium)
                | (Free, Expired)
            // From TRIAL
                | (Trial, Trial)
                | (Trial, Premium) // Conversion
                | (Trial, Free)
                | (Trial, Expired)
            // From PREMIUM (never back to Trial; Free -> Trial after Premium
            // is refused by `EntitlementSnapshot::can_become`)
                | (Premium, Premium) // Renewal
                | (Premium, Free)
                | (Premium, Expired)
            // From EXPIRED
                | (Expired, Expired)
                | (Expired, Free)
                | (Expired, Premium) // Resubscribe
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use EntitlementTier::*;
        match self {
            Unknown => vec![Free, Trial, Premium, Expired],
            Free => vec![Free, Trial, Premium, Expired],
            Trial => vec![Trial, Premium, Free, Expired],
            Premium => vec![Premium, Free, Expired],
            Expired => vec![Expired, Free, Premium],
        }
    }
}
