//! Tier-based daily allowances.
//!
//! Defines how many of each metered action a tier may perform per day.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::EntitlementTier;
use crate::domain::usage::MeteredAction;

/// Free-tier recipe views per day.
pub const DEFAULT_RECIPE_VIEW_LIMIT: u32 = 10;
/// Free-tier searches per day.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// Free-tier AI recipe generations per day.
pub const DEFAULT_RECIPE_GENERATION_LIMIT: u32 = 3;

static DEFAULT_LIMITS: Lazy<TierLimits> = Lazy::new(|| {
    TierLimits::with_free_limits(
        DEFAULT_RECIPE_VIEW_LIMIT,
        DEFAULT_SEARCH_LIMIT,
        DEFAULT_RECIPE_GENERATION_LIMIT,
    )
});

/// Daily allowance for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allowance {
    /// At most this many per day.
    Limited(u32),
    Unlimited,
}

/// Static tier -> action -> allowance table.
///
/// # Default Configuration
///
/// | Tier | recipe_view | search | recipe_generation |
/// |------|-------------|--------|-------------------|
/// | Free / Unknown / Expired | 10 | 20 | 3 |
/// | Trial / Premium | Unlimited | Unlimited | Unlimited |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierLimits {
    table: HashMap<EntitlementTier, HashMap<MeteredAction, Allowance>>,
}

impl TierLimits {
    /// Builds the table from the three free-tier limits. Paid tiers are
    /// unlimited.
    pub fn with_free_limits(recipe_views: u32, searches: u32, generations: u32) -> Self {
        let free = HashMap::from([
            (MeteredAction::RecipeView, Allowance::Limited(recipe_views)),
            (MeteredAction::Search, Allowance::Limited(searches)),
            (MeteredAction::RecipeGeneration, Allowance::Limited(generations)),
        ]);
        let unlimited: HashMap<_, _> = MeteredAction::ALL
            .iter()
            .map(|action| (*action, Allowance::Unlimited))
            .collect();

        Self {
            table: HashMap::from([
                (EntitlementTier::Free, free),
                (EntitlementTier::Trial, unlimited.clone()),
                (EntitlementTier::Premium, unlimited),
            ]),
        }
    }

    /// Overrides one entry.
    pub fn with_allowance(
        mut self,
        tier: EntitlementTier,
        action: MeteredAction,
        allowance: Allowance,
    ) -> Self {
        self.table.entry(tier).or_default().insert(action, allowance);
        self
    }

    /// Allowance for `action` under `tier`.
    ///
    /// `Unknown` and `Expired` share the `Free` row. A missing entry is
    /// `Limited(0)` so an incomplete table denies rather than grants.
    pub fn allowance(&self, tier: EntitlementTier, action: MeteredAction) -> Allowance {
        let row = match tier {
            EntitlementTier::Unknown | EntitlementTier::Expired => EntitlementTier::Free,
            other => other,
        };
        self.table
            .get(&row)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(Allowance::Limited(0))
    }
}

impl Default for TierLimits {
    fn default() -> Self {
        DEFAULT_LIMITS.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_has_10_recipe_views() {
        let limits = TierLimits::default();
        assert_eq!(
            limits.allowance(EntitlementTier::Free, MeteredAction::RecipeView),
            Allowance::Limited(10)
        );
    }

    #[test]
    fn free_tier_has_3_generations() {
        let limits = TierLimits::default();
        assert_eq!(
            limits.allowance(EntitlementTier::Free, MeteredAction::RecipeGeneration),
            Allowance::Limited(3)
        );
    }

    #[test]
    fn premium_and_trial_are_unlimited() {
        let limits = TierLimits::default();
        for action in MeteredAction::ALL {
            assert_eq!(
                limits.allowance(EntitlementTier::Premium, action),
                Allowance::Unlimited
            );
            assert_eq!(
                limits.allowance(EntitlementTier::Trial, action),
                Allowance::Unlimited
            );
        }
    }

    #[test]
    fn unknown_and_expired_use_free_row() {
        let limits = TierLimits::with_free_limits(4, 5, 6);
        for tier in [EntitlementTier::Unknown, EntitlementTier::Expired] {
            assert_eq!(
                limits.allowance(tier, MeteredAction::Search),
                Allowance::Limited(5)
            );
        }
    }

    #[test]
    fn missing_entry_denies() {
        let limits = TierLimits {
            table: HashMap::new(),
        };
        assert_eq!(
            limits.allowance(EntitlementTier::Free, MeteredAction::Search),
            Allowance::Limited(0)
        );
    }

    #[test]
    fn with_allowance_overrides_entry() {
        let limits = TierLimits::default().with_allowance(
            EntitlementTier::Free,
            MeteredAction::Search,
            Allowance::Unlimited,
        );
        assert_eq!(
            limits.allowance(EntitlementTier::Free, MeteredAction::Search),
            Allowance::Unlimited
        );
    }
}
