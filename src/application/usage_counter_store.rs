//! UsageCounterStore - Per-day counters for metered actions.
//!
//! Every read-modify-write runs under one async mutex: all counters share the
//! `usage_counters` key, so two increments for different actions would still
//! race on the same record.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DayKey, QuotaError};
use crate::domain::usage::{MeteredAction, UsageCounters};
use crate::ports::{Clock, DurableStore, USAGE_COUNTERS_KEY};

/// Today's count for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageReading {
    pub action: MeteredAction,
    pub count: u32,
    pub day_key: DayKey,
}

/// Owner of the persisted usage counters.
pub struct UsageCounterStore {
    store: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl UsageCounterStore {
    pub fn new(store: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Today's count for `action`, resetting first if the day rolled over.
    pub async fn get(&self, action: MeteredAction) -> Result<UsageReading, QuotaError> {
        let counters = self.snapshot().await?;
        Ok(UsageReading {
            action,
            count: counters.count(action),
            day_key: counters.day_key(),
        })
    }

    /// All of today's counters, resetting first if the day rolled over.
    pub async fn snapshot(&self) -> Result<UsageCounters, QuotaError> {
        let _guard = self.lock.lock().await;
        self.load_current().await
    }

    /// Adds one use of `action` and returns the persisted count.
    ///
    /// The new count only counts once the write has succeeded. On
    /// `StorageWriteFailed` the stored record is unchanged.
    pub async fn increment(&self, action: MeteredAction) -> Result<u32, QuotaError> {
        let _guard = self.lock.lock().await;

        let mut counters = self.load_current().await?;
        let count = counters.increment(action);
        self.persist(&counters).await?;

        tracing::debug!(action = %action, count, day_key = %counters.day_key(), "usage recorded");
        Ok(count)
    }

    /// Zeroes every counter for today.
    pub async fn reset_all(&self) -> Result<(), QuotaError> {
        let _guard = self.lock.lock().await;

        let today = self.clock.today();
        self.persist(&UsageCounters::fresh(today)).await?;

        tracing::info!(day_key = %today, "usage counters reset manually");
        Ok(())
    }

    /// Stored counters if they belong to today, otherwise a persisted fresh
    /// record. Caller must hold `lock`.
    async fn load_current(&self) -> Result<UsageCounters, QuotaError> {
        let today = self.clock.today();

        match self.read_stored().await? {
            Some(counters) if counters.is_for(today) => Ok(counters),
            previous => {
                if let Some(previous) = previous {
                    tracing::info!(
                        from = %previous.day_key(),
                        to = %today,
                        "usage counters rolled over"
                    );
                } else {
                    tracing::debug!(day_key = %today, "initializing usage counters");
                }
                let fresh = UsageCounters::fresh(today);
                self.persist(&fresh).await?;
                Ok(fresh)
            }
        }
    }

    /// Decoded counters, or None if absent or corrupt.
    async fn read_stored(&self) -> Result<Option<UsageCounters>, QuotaError> {
        let Some(bytes) = self.store.get(USAGE_COUNTERS_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<UsageCounters>(&bytes) {
            Ok(counters) => Ok(Some(counters)),
            Err(e) => {
                let err = QuotaError::storage_corrupt(USAGE_COUNTERS_KEY, e.to_string());
                tracing::warn!(error = %err, "discarding unreadable usage counters");
                Ok(None)
            }
        }
    }

    async fn persist(&self, counters: &UsageCounters) -> Result<(), QuotaError> {
        let bytes = serde_json::to_vec(counters)
            .map_err(|e| QuotaError::write_failed(e.to_string()))?;
        self.store.set(USAGE_COUNTERS_KEY, &bytes).await?;
        Ok(())
    }
}
