//! Entitlement provider adapters.
//!
//! - `MockEntitlementProvider` - Scriptable provider for tests
//! - `OfflineEntitlementProvider` - Always unreachable; cached state only

mod mock_provider;
mod offline_provider;

pub use mock_provider::MockEntitlementProvider;
pub use offline_provider::OfflineEntitlementProvider;
