//! Provider used when no subscription backend is wired in.

use async_trait::async_trait;

use crate::domain::entitlement::EntitlementStatus;
use crate::domain::foundation::TransactionId;
use crate::ports::{EntitlementProvider, ProviderError, PurchaseRequest};

/// Every call fails with `Unreachable`.
///
/// Lets the engine run on cached state alone, for support tooling and for
/// builds without a store SDK.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEntitlementProvider;

const OFFLINE: &str = "no entitlement provider configured";

#[async_trait]
impl EntitlementProvider for OfflineEntitlementProvider {
    async fn fetch_status(&self) -> Result<EntitlementStatus, ProviderError> {
        Err(ProviderError::unreachable(OFFLINE))
    }

    async fn purchase(
        &self,
        _request: PurchaseRequest,
    ) -> Result<Option<EntitlementStatus>, ProviderError> {
        Err(ProviderError::unreachable(OFFLINE))
    }

    async fn restore(
        &self,
        _transaction_id: TransactionId,
    ) -> Result<Option<EntitlementStatus>, ProviderError> {
        Err(ProviderError::unreachable(OFFLINE))
    }
}
