//! Application layer - Services coordinating domain logic and ports.
//!
//! - `UsageCounterStore` - Per-day counters with rollover and self-healing
//! - `EntitlementCache` - Cached entitlement, refresh and lazy expiry
//! - `PurchaseCoordinator` - Single-flight purchase/restore with watchdog
//! - `EntitlementGate` - The operations exposed to the rest of the app

mod entitlement_cache;
mod gate;
mod purchase_coordinator;
mod usage_counter_store;

pub use entitlement_cache::{EntitlementCache, RefreshOutcome};
pub use gate::{CanPerformResult, EntitlementGate, GateSettings};
pub use purchase_coordinator::PurchaseCoordinator;
pub use usage_counter_store::{UsageCounterStore, UsageReading};
