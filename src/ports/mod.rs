//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `Clock` - Current time and the user's local day
//! - `DurableStore` - Byte-level key/value persistence
//! - `EntitlementProvider` - Subscription backend (status, purchase, restore)

mod clock;
mod durable_store;
mod entitlement_provider;

pub use clock::Clock;
pub use durable_store::{
    DurableStore, DurableStoreError, ENTITLEMENT_SNAPSHOT_KEY, USAGE_COUNTERS_KEY,
};
pub use entitlement_provider::{EntitlementProvider, ProviderError, PurchaseRequest};
