//! PurchaseCoordinator - Single-flight purchase and restore.
//!
//! At most one transaction runs at a time. A caller asking for the same
//! thing while it runs gets the same outcome; a caller asking for something
//! else is turned away with `TransactionInProgress`.
//!
//! The transaction runs on its own task so it completes (and releases the
//! slot) even if every caller stops waiting. A watchdog bounds it.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::EntitlementCache;
use crate::domain::entitlement::EntitlementSnapshot;
use crate::domain::foundation::{QuotaError, TransactionId};
use crate::domain::purchase::{
    Transaction, TransactionKind, TransactionOutcome, TransactionReceipt,
};
use crate::ports::{Clock, EntitlementProvider, PurchaseRequest};

type SharedOutcome = Shared<BoxFuture<'static, Result<TransactionReceipt, QuotaError>>>;

struct InFlight {
    transaction: Transaction,
    outcome: SharedOutcome,
}

struct CoordinatorInner {
    provider: Arc<dyn EntitlementProvider>,
    cache: Arc<EntitlementCache>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    in_flight: Mutex<Option<InFlight>>,
}

/// Serializes purchases and restores against the entitlement provider.
///
/// Cheap to clone; clones share the single-flight slot.
#[derive(Clone)]
pub struct PurchaseCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl PurchaseCoordinator {
    pub fn new(
        provider: Arc<dyn EntitlementProvider>,
        cache: Arc<EntitlementCache>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                provider,
                cache,
                clock,
                timeout,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Buys `product_id`, or joins an in-flight purchase of the same product.
    pub async fn purchase(
        &self,
        product_id: impl Into<String>,
    ) -> Result<TransactionReceipt, QuotaError> {
        self.attach_or_start(TransactionKind::purchase(product_id))?
            .await
    }

    /// Restores previous purchases, or joins an in-flight restore.
    pub async fn restore(&self) -> Result<TransactionReceipt, QuotaError> {
        self.attach_or_start(TransactionKind::Restore)?.await
    }

    /// The transaction currently holding the slot, if any.
    pub fn in_flight(&self) -> Option<Transaction> {
        self.inner
            .slot()
            .as_ref()
            .map(|in_flight| in_flight.transaction.clone())
    }

    fn attach_or_start(&self, kind: TransactionKind) -> Result<SharedOutcome, QuotaError> {
        let mut slot = self.inner.slot();

        if let Some(in_flight) = slot.as_ref() {
            let current = &in_flight.transaction;
            if current.is_joinable_by(&kind) {
                tracing::debug!(transaction_id = %current.id, kind = %kind, "joining in-flight transaction");
                return Ok(in_flight.outcome.clone());
            }
            tracing::debug!(
                transaction_id = %current.id,
                current = %current.kind,
                requested = %kind,
                "transaction slot busy"
            );
            return Err(QuotaError::TransactionInProgress {
                kind: current.kind.label().to_string(),
            });
        }

        let transaction = Transaction::start(kind, self.inner.clock.now());
        tracing::info!(transaction_id = %transaction.id, kind = %transaction.kind, "transaction started");

        let inner = self.inner.clone();
        let task_transaction = transaction.clone();
        let handle = tokio::spawn(async move {
            let result = inner.run_with_watchdog(&task_transaction).await;
            inner.release(task_transaction.id);
            result
        });

        let inner = self.inner.clone();
        let id = transaction.id;
        let outcome = async move {
            match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    inner.release(id);
                    tracing::error!(transaction_id = %id, error = %join_error, "transaction task aborted");
                    Err(QuotaError::rejected(format!("transaction aborted: {}", join_error)))
                }
            }
        }
        .boxed()
        .shared();

        *slot = Some(InFlight {
            transaction,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }
}

impl CoordinatorInner {
    fn slot(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Frees the slot if `id` still holds it.
    fn release(&self, id: TransactionId) {
        let mut slot = self.slot();
        if slot
            .as_ref()
            .map(|in_flight| in_flight.transaction.id == id)
            .unwrap_or(false)
        {
            *slot = None;
        }
    }

    async fn run_with_watchdog(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionReceipt, QuotaError> {
        let result = match tokio::time::timeout(self.timeout, self.run(transaction)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    timeout_secs = self.timeout.as_secs(),
                    "transaction watchdog fired"
                );
                Err(QuotaError::TransactionTimeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        match &result {
            Ok(receipt) => tracing::info!(
                transaction_id = %transaction.id,
                outcome = ?receipt.outcome.snapshot().map(|s| s.tier),
                "transaction completed"
            ),
            Err(err) => tracing::warn!(
                transaction_id = %transaction.id,
                code = %err.code(),
                error = %err,
                "transaction failed"
            ),
        }
        result
    }

    async fn run(&self, transaction: &Transaction) -> Result<TransactionReceipt, QuotaError> {
        let outcome = match &transaction.kind {
            TransactionKind::Purchase { product_id } => {
                let request = PurchaseRequest {
                    product_id: product_id.clone(),
                    transaction_id: transaction.id,
                };
                let status = match self.provider.purchase(request).await? {
                    Some(status) => status,
                    None => self.provider.fetch_status().await?,
                };
                let snapshot = EntitlementSnapshot::from_status(status, self.clock.now());
                TransactionOutcome::Purchased(self.commit_after_charge(transaction, snapshot).await?)
            }
            TransactionKind::Restore => match self.provider.restore(transaction.id).await? {
                Some(status) => {
                    let snapshot = EntitlementSnapshot::from_status(status, self.clock.now());
                    if snapshot.tier.is_paid() {
                        TransactionOutcome::Restored(self.cache.commit(snapshot).await?)
                    } else {
                        TransactionOutcome::NothingToRestore
                    }
                }
                None => TransactionOutcome::NothingToRestore,
            },
        };

        Ok(TransactionReceipt {
            transaction_id: transaction.id,
            kind: transaction.kind.clone(),
            outcome,
        })
    }

    /// Commits a purchase result. The user has already been charged, so a
    /// failure here is logged at error level.
    async fn commit_after_charge(
        &self,
        transaction: &Transaction,
        snapshot: EntitlementSnapshot,
    ) -> Result<EntitlementSnapshot, QuotaError> {
        self.cache.commit(snapshot).await.map_err(|err| {
            tracing::error!(
                transaction_id = %transaction.id,
                error = %err,
                "purchase succeeded but entitlement could not be saved"
            );
            err
        })
    }
}
