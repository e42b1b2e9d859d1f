//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, day keys, ids, errors)
//! - `usage` - Metered actions and per-day counters
//! - `entitlement` - Tiers, cached snapshots, allowances and staleness
//! - `gating` - Pure allow/deny policy
//! - `purchase` - Purchase and restore transactions

pub mod entitlement;
pub mod foundation;
pub mod gating;
pub mod purchase;
pub mod usage;
