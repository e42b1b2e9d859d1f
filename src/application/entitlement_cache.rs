//! EntitlementCache - Last-known entitlement and its freshness.
//!
//! Reads apply lazy expiry against the clock. Every write, whether from a
//! background refresh or a purchase commit, is checked against the tier
//! state machine before it replaces the stored snapshot.
//!
//! Writes are numbered. A refresh remembers the number it started under and
//! drops its result if anything was written while the provider call was
//! outstanding, so a slow fetch never overwrites a newer purchase.

use chrono::Duration;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entitlement::EntitlementSnapshot;
use crate::domain::foundation::QuotaError;
use crate::ports::{Clock, DurableStore, EntitlementProvider, ENTITLEMENT_SNAPSHOT_KEY};

/// Result of asking the provider for a fresh status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Fresh snapshot, or the cached one (lazily expired) if refresh failed.
    pub snapshot: EntitlementSnapshot,
    /// Why the snapshot is not fresh, if it isn't.
    pub warning: Option<QuotaError>,
}

impl RefreshOutcome {
    pub fn is_fresh(&self) -> bool {
        self.warning.is_none()
    }
}

/// Owner of the persisted entitlement snapshot.
pub struct EntitlementCache {
    store: Arc<dyn DurableStore>,
    provider: Arc<dyn EntitlementProvider>,
    clock: Arc<dyn Clock>,
    /// Serializes writes. Holds the number of writes made so far.
    generation: Mutex<u64>,
}

impl EntitlementCache {
    pub fn new(
        store: Arc<dyn DurableStore>,
        provider: Arc<dyn EntitlementProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
            generation: Mutex::new(0),
        }
    }

    /// Cached snapshot as it stands now: a paid tier past its expiry reads
    /// as `Expired`. Defaults to `Unknown` when nothing is stored.
    pub async fn get(&self) -> Result<EntitlementSnapshot, QuotaError> {
        let stored = self.load().await?;
        Ok(stored.effective_at(self.clock.now()))
    }

    /// True if the snapshot is older than `max_age` or was never fetched.
    pub async fn is_stale(&self, max_age: Duration) -> Result<bool, QuotaError> {
        let stored = self.load().await?;
        Ok(stored.is_stale_at(self.clock.now(), max_age))
    }

    /// Fetches the current status from the provider and caches it.
    ///
    /// Provider failures do not fail the call: the cached snapshot comes
    /// back with the reason in `warning`. A status the state machine rejects
    /// also comes back as a warning, but the cached snapshot is re-stamped
    /// since the provider did answer. A result overtaken by a newer write is
    /// dropped in favour of that write. Storage errors are returned as
    /// errors.
    pub async fn refresh(&self) -> Result<RefreshOutcome, QuotaError> {
        let started_under = *self.generation.lock().await;

        let status = match self.provider.fetch_status().await {
            Ok(status) => status,
            Err(e) => {
                let err = QuotaError::from(e);
                tracing::warn!(error = %err, "entitlement refresh failed, serving cached snapshot");
                return Ok(RefreshOutcome {
                    snapshot: self.get().await?,
                    warning: Some(err),
                });
            }
        };

        let mut generation = self.generation.lock().await;
        if *generation != started_under {
            tracing::debug!(
                started_under,
                current = *generation,
                "dropping refresh overtaken by a newer entitlement write"
            );
            return Ok(RefreshOutcome {
                snapshot: self.get().await?,
                warning: None,
            });
        }

        let now = self.clock.now();
        let fetched = EntitlementSnapshot::from_status(status, now);
        match self.write_checked(&mut generation, fetched).await {
            Ok(snapshot) => Ok(RefreshOutcome {
                snapshot,
                warning: None,
            }),
            Err(err @ QuotaError::InvalidTransition { .. }) => {
                let confirmed = self.load().await?.effective_at(now).restamped(now);
                self.persist(&mut generation, &confirmed).await?;
                Ok(RefreshOutcome {
                    snapshot: confirmed,
                    warning: Some(err),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces the stored snapshot if the tier change is legal.
    ///
    /// Returns the snapshot as committed.
    pub(crate) async fn commit(
        &self,
        snapshot: EntitlementSnapshot,
    ) -> Result<EntitlementSnapshot, QuotaError> {
        let mut generation = self.generation.lock().await;
        self.write_checked(&mut generation, snapshot).await
    }

    /// Forgets the cached entitlement; the next read is `Unknown`.
    pub async fn clear(&self) -> Result<(), QuotaError> {
        let mut generation = self.generation.lock().await;
        self.store.delete(ENTITLEMENT_SNAPSHOT_KEY).await?;
        *generation += 1;
        tracing::info!("entitlement snapshot cleared");
        Ok(())
    }

    async fn write_checked(
        &self,
        generation: &mut u64,
        snapshot: EntitlementSnapshot,
    ) -> Result<EntitlementSnapshot, QuotaError> {
        let current = self.load().await?.effective_at(self.clock.now());
        if !current.can_become(&snapshot) {
            tracing::warn!(
                from = ?current.tier,
                to = ?snapshot.tier,
                ever_premium = current.ever_premium,
                "rejecting entitlement transition"
            );
            return Err(QuotaError::invalid_transition(current.tier, snapshot.tier));
        }

        let snapshot = current.superseded_by(snapshot);
        self.persist(generation, &snapshot).await?;

        if current.tier != snapshot.tier {
            tracing::info!(from = ?current.tier, to = ?snapshot.tier, "entitlement tier changed");
        }
        Ok(snapshot)
    }

    async fn persist(
        &self,
        generation: &mut u64,
        snapshot: &EntitlementSnapshot,
    ) -> Result<(), QuotaError> {
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| QuotaError::write_failed(e.to_string()))?;
        self.store.set(ENTITLEMENT_SNAPSHOT_KEY, &bytes).await?;
        *generation += 1;
        Ok(())
    }

    /// Stored snapshot without expiry applied. Corrupt data reads as the
    /// default snapshot.
    async fn load(&self) -> Result<EntitlementSnapshot, QuotaError> {
        let Some(bytes) = self.store.get(ENTITLEMENT_SNAPSHOT_KEY).await? else {
            return Ok(EntitlementSnapshot::unknown());
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let err = QuotaError::storage_corrupt(ENTITLEMENT_SNAPSHOT_KEY, e.to_string());
                tracing::warn!(error = %err, "discarding unreadable entitlement snapshot");
                Ok(EntitlementSnapshot::unknown())
            }
        }
    }
}
