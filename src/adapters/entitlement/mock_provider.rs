//! Mock entitlement provider for testing.
//!
//! Configurable implementation of the `EntitlementProvider` port:
//!
//! - Sticky status for `fetch_status`
//! - Queued purchase and restore responses (consumed in order)
//! - Simulated latency for watchdog and single-flight tests
//! - Call tracking for assertions
//!
//! # Example
//!
//! ```ignore
//! let provider = MockEntitlementProvider::new()
//!     .with_status(EntitlementStatus::free())
//!     .with_transaction_delay(Duration::from_secs(45));
//!
//! provider.push_purchase(Ok(None));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::entitlement::EntitlementStatus;
use crate::domain::foundation::TransactionId;
use crate::ports::{EntitlementProvider, ProviderError, PurchaseRequest};

type StatusResult = Result<Option<EntitlementStatus>, ProviderError>;

/// Mock entitlement provider.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing one to the engine.
#[derive(Debug, Clone, Default)]
pub struct MockEntitlementProvider {
    inner: Arc<Mutex<MockState>>,
    management_url: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    /// What `fetch_status` returns. None reads as a free user.
    status: Option<Result<EntitlementStatus, ProviderError>>,
    purchases: VecDeque<StatusResult>,
    restores: VecDeque<StatusResult>,
    fetch_calls: usize,
    purchase_calls: Vec<PurchaseRequest>,
    restore_calls: Vec<TransactionId>,
    fetch_delay: Duration,
    transaction_delay: Duration,
}

impl MockEntitlementProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════════

    /// Status returned by `fetch_status` until changed.
    pub fn with_status(self, status: EntitlementStatus) -> Self {
        self.set_status(status);
        self
    }

    /// Latency added to `fetch_status`. The reply reflects the status at
    /// the time the request arrived.
    pub fn with_fetch_delay(self, delay: Duration) -> Self {
        self.set_fetch_delay(delay);
        self
    }

    /// Latency added to `purchase` and `restore`.
    pub fn with_transaction_delay(self, delay: Duration) -> Self {
        self.set_transaction_delay(delay);
        self
    }

    pub fn with_management_url(mut self, url: impl Into<String>) -> Self {
        self.management_url = Some(url.into());
        self
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state().fetch_delay = delay;
    }

    pub fn set_transaction_delay(&self, delay: Duration) {
        self.state().transaction_delay = delay;
    }

    pub fn set_status(&self, status: EntitlementStatus) {
        self.state().status = Some(Ok(status));
    }

    /// Make `fetch_status` fail until a status is set again.
    pub fn set_fetch_error(&self, error: ProviderError) {
        self.state().status = Some(Err(error));
    }

    /// Queue the result of the next `purchase` call.
    ///
    /// With an empty queue, purchases succeed with a sandbox premium status
    /// for the requested product.
    pub fn push_purchase(&self, result: StatusResult) {
        self.state().purchases.push_back(result);
    }

    /// Queue the result of the next `restore` call.
    ///
    /// With an empty queue, restores find nothing.
    pub fn push_restore(&self, result: StatusResult) {
        self.state().restores.push_back(result);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn fetch_calls(&self) -> usize {
        self.state().fetch_calls
    }

    pub fn purchase_calls(&self) -> Vec<PurchaseRequest> {
        self.state().purchase_calls.clone()
    }

    pub fn restore_calls(&self) -> Vec<TransactionId> {
        self.state().restore_calls.clone()
    }
}

#[async_trait]
impl EntitlementProvider for MockEntitlementProvider {
    async fn fetch_status(&self) -> Result<EntitlementStatus, ProviderError> {
        let (reply, delay) = {
            let mut state = self.state();
            state.fetch_calls += 1;
            let reply = state
                .status
                .clone()
                .unwrap_or_else(|| Ok(EntitlementStatus::free()));
            (reply, state.fetch_delay)
        };

        if !delay.is_zero() {
            sleep(delay).await;
        }

        reply
    }

    async fn purchase(&self, request: PurchaseRequest) -> StatusResult {
        let (queued, delay) = {
            let mut state = self.state();
            state.purchase_calls.push(request.clone());
            (state.purchases.pop_front(), state.transaction_delay)
        };

        if !delay.is_zero() {
            sleep(delay).await;
        }

        let result = queued.unwrap_or_else(|| {
            Ok(Some(
                EntitlementStatus::premium(request.product_id.clone(), None).sandbox(),
            ))
        });

        // A completed purchase is what the backend reports from now on.
        if let Ok(Some(status)) = &result {
            self.set_status(status.clone());
        }
        result
    }

    async fn restore(&self, transaction_id: TransactionId) -> StatusResult {
        let (queued, delay) = {
            let mut state = self.state();
            state.restore_calls.push(transaction_id);
            (state.restores.pop_front(), state.transaction_delay)
        };

        if !delay.is_zero() {
            sleep(delay).await;
        }

        queued.unwrap_or(Ok(None))
    }

    fn management_url(&self) -> Option<String> {
        self.management_url.clone()
    }
}
