//! Entitlement domain module.
//!
//! Subscription tiers, the cached entitlement snapshot, daily allowances and
//! the staleness policy applied when the provider cannot be reached.
//!
//! # Module Structure
//!
//! - `tier` - EntitlementTier state machine
//! - `snapshot` - EntitlementSnapshot and provider EntitlementStatus
//! - `tier_limits` - Allowance table per tier
//! - `staleness` - StalenessPolicy (fail-open / fail-closed)

mod snapshot;
mod staleness;
mod tier;
mod tier_limits;

pub use snapshot::{EntitlementSnapshot, EntitlementStatus};
pub use staleness::{StalePolicy, StalenessPolicy};
pub use tier::EntitlementTier;
pub use tier_limits::{
    Allowance, TierLimits, DEFAULT_RECIPE_GENERATION_LIMIT, DEFAULT_RECIPE_VIEW_LIMIT,
    DEFAULT_SEARCH_LIMIT,
};
