//! Entitlement provider port for the external subscription service.
//!
//! Wraps the store SDK / subscription backend that knows what the user has
//! paid for. The engine only ever asks it three things: what is the current
//! status, buy this product, and restore previous purchases.
//!
//! # Design
//!
//! - **Idempotent**: every purchase and restore carries a `TransactionId` the
//!   provider can de-duplicate on
//! - **Snapshot optional**: a successful purchase may come back without a
//!   status, in which case the engine follows up with `fetch_status`

use async_trait::async_trait;

use crate::domain::entitlement::EntitlementStatus;
use crate::domain::foundation::{QuotaError, TransactionId};

/// Port for entitlement provider integrations.
#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    /// Current entitlement status for the signed-in user.
    async fn fetch_status(&self) -> Result<EntitlementStatus, ProviderError>;

    /// Buy `request.product_id`.
    ///
    /// `Ok(None)` means the purchase succeeded but the provider did not
    /// return the resulting status.
    async fn purchase(
        &self,
        request: PurchaseRequest,
    ) -> Result<Option<EntitlementStatus>, ProviderError>;

    /// Restore earlier purchases. `Ok(None)` means nothing was found.
    async fn restore(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<EntitlementStatus>, ProviderError>;

    /// Where the user manages their subscription, if the provider has one.
    fn management_url(&self) -> Option<String> {
        None
    }
}

/// Request to buy a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub product_id: String,
    pub transaction_id: TransactionId,
}

/// Errors returned by an entitlement provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Network or service outage.
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// Payment declined, receipt invalid, product unknown.
    #[error("rejected: {0}")]
    Rejected(String),

    /// User dismissed the purchase sheet.
    #[error("cancelled by user")]
    UserCancelled,
}

impl ProviderError {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable(reason.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

impl From<ProviderError> for QuotaError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unreachable(reason) => QuotaError::unreachable(reason),
            ProviderError::Rejected(reason) => QuotaError::rejected(reason),
            ProviderError::UserCancelled => QuotaError::PurchaseCancelled,
        }
    }
}
