//! Pure gating decision.
//!
//! Combines entitlement, today's counters and the allowance table into a
//! verdict. No I/O and no clock: callers pass the snapshot as it stands now
//! (`EntitlementSnapshot::effective_at` / `StalenessPolicy::apply`).

use super::Verdict;
use crate::domain::entitlement::{Allowance, EntitlementSnapshot, EntitlementTier, TierLimits};
use crate::domain::usage::{MeteredAction, UsageCounters};

/// Stateless gating policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatingPolicy;

impl GatingPolicy {
    /// Decides whether `action` may run.
    ///
    /// Expects the snapshot as it stands now; this function has no clock.
    /// A paid snapshot that had already lapsed when it was fetched is still
    /// gated as `Expired`.
    ///
    /// 1. Premium / Trial: allowed, unlimited.
    /// 2. Otherwise the tier's row (Free for Unknown and Expired): allowed
    ///    while `count < limit`, reporting the quota left after this action;
    ///    denied with zero remaining once the limit is reached.
    pub fn evaluate(
        action: MeteredAction,
        snapshot: &EntitlementSnapshot,
        counters: &UsageCounters,
        limits: &TierLimits,
    ) -> Verdict {
        let tier = match snapshot.fetched_at {
            Some(fetched_at) if snapshot.has_lapsed_at(fetched_at) => EntitlementTier::Expired,
            _ => snapshot.tier,
        };
        if tier.is_paid() {
            return Verdict::unlimited();
        }

        match limits.allowance(tier, action) {
            Allowance::Unlimited => Verdict::unlimited(),
            Allowance::Limited(limit) => {
                let used = counters.count(action);
                if used < limit {
                    Verdict::allowed_with(limit - used - 1)
                } else {
                    Verdict::denied()
                }
            }
        }
    }
}
