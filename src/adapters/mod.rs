//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `clock` - System and manual clocks
//! - `storage` - File and in-memory durable stores
//! - `entitlement` - Mock and offline entitlement providers

pub mod clock;
pub mod entitlement;
pub mod storage;

pub use clock::{ManualClock, SystemClock};
pub use entitlement::{MockEntitlementProvider, OfflineEntitlementProvider};
pub use storage::{FileDurableStore, InMemoryDurableStore};
