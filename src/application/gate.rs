//! EntitlementGate - The operations screens and the paywall call.
//!
//! Wires the usage counters, the entitlement cache and the purchase
//! coordinator around the pure gating policy. Constructed once at startup
//! and shared by reference.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::{EntitlementCache, PurchaseCoordinator, RefreshOutcome, UsageCounterStore};
use crate::config::AppConfig;
use crate::domain::entitlement::{EntitlementSnapshot, EntitlementTier, StalenessPolicy, TierLimits};
use crate::domain::foundation::QuotaError;
use crate::domain::gating::{GatingPolicy, Verdict};
use crate::domain::purchase::TransactionReceipt;
use crate::domain::usage::{MeteredAction, UsageCounters};
use crate::ports::{Clock, DurableStore, EntitlementProvider};

/// Tunables for an `EntitlementGate`.
#[derive(Debug, Clone)]
pub struct GateSettings {
    pub limits: TierLimits,
    pub staleness: StalenessPolicy,
    pub transaction_timeout: Duration,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            limits: TierLimits::default(),
            staleness: StalenessPolicy::default(),
            transaction_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&AppConfig> for GateSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            limits: config.quota.tier_limits(),
            staleness: config.entitlement.staleness_policy(),
            transaction_timeout: config.purchase.transaction_timeout(),
        }
    }
}

/// Answer to `can_perform`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanPerformResult {
    pub action: MeteredAction,
    pub verdict: Verdict,
    /// Tier the verdict was computed against.
    pub tier: EntitlementTier,
    /// Set when the entitlement could not be refreshed and a cached value
    /// was used instead.
    #[serde(skip)]
    pub warning: Option<QuotaError>,
}

impl CanPerformResult {
    pub fn allowed(&self) -> bool {
        self.verdict.allowed
    }
}

/// Quota and entitlement gate.
pub struct EntitlementGate {
    usage: UsageCounterStore,
    cache: Arc<EntitlementCache>,
    coordinator: PurchaseCoordinator,
    provider: Arc<dyn EntitlementProvider>,
    clock: Arc<dyn Clock>,
    limits: TierLimits,
    staleness: StalenessPolicy,
}

impl EntitlementGate {
    pub fn new(
        store: Arc<dyn DurableStore>,
        provider: Arc<dyn EntitlementProvider>,
        clock: Arc<dyn Clock>,
        settings: GateSettings,
    ) -> Self {
        let cache = Arc::new(EntitlementCache::new(
            store.clone(),
            provider.clone(),
            clock.clone(),
        ));
        let coordinator = PurchaseCoordinator::new(
            provider.clone(),
            cache.clone(),
            clock.clone(),
            settings.transaction_timeout,
        );

        Self {
            usage: UsageCounterStore::new(store, clock.clone()),
            cache,
            coordinator,
            provider,
            clock,
            limits: settings.limits,
            staleness: settings.staleness,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn DurableStore>,
        provider: Arc<dyn EntitlementProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(store, provider, clock, GateSettings::from(config))
    }

    /// May the user perform `action` now?
    ///
    /// Refreshes the entitlement first if it is stale. A failed refresh is
    /// not an error: the cached entitlement is used under the staleness
    /// policy and the reason is reported in `warning`.
    pub async fn can_perform(&self, action: MeteredAction) -> Result<CanPerformResult, QuotaError> {
        let (snapshot, warning) = self.entitlement_for_gating().await?;
        let counters = self.usage.snapshot().await?;

        let verdict = GatingPolicy::evaluate(action, &snapshot, &counters, &self.limits);
        tracing::debug!(
            action = %action,
            tier = ?snapshot.tier,
            allowed = verdict.allowed,
            remaining = ?verdict.remaining,
            "gating decision"
        );

        Ok(CanPerformResult {
            action,
            verdict,
            tier: snapshot.tier,
            warning,
        })
    }

    /// Records one completed `action`; returns the persisted count.
    pub async fn record_usage(&self, action: MeteredAction) -> Result<u32, QuotaError> {
        self.usage.increment(action).await
    }

    /// Entitlement as gating currently sees it (lazy expiry and staleness
    /// policy applied). Does not contact the provider.
    pub async fn current_entitlement(&self) -> Result<EntitlementSnapshot, QuotaError> {
        let cached = self.cache.get().await?;
        Ok(self.staleness.apply(&cached, self.clock.now()))
    }

    /// Forces a provider refresh regardless of age.
    pub async fn refresh_entitlement(&self) -> Result<RefreshOutcome, QuotaError> {
        self.cache.refresh().await
    }

    /// Today's counters for every action.
    pub async fn usage_today(&self) -> Result<UsageCounters, QuotaError> {
        self.usage.snapshot().await
    }

    pub async fn purchase(
        &self,
        product_id: impl Into<String>,
    ) -> Result<TransactionReceipt, QuotaError> {
        self.coordinator.purchase(product_id).await
    }

    pub async fn restore(&self) -> Result<TransactionReceipt, QuotaError> {
        self.coordinator.restore().await
    }

    /// Subscription management link, passed through from the provider.
    pub fn management_url(&self) -> Option<String> {
        self.provider.management_url()
    }

    /// Drops the cached entitlement. Usage counters are per device and stay.
    pub async fn logout(&self) -> Result<(), QuotaError> {
        self.cache.clear().await
    }

    /// Support tooling: zero today's counters.
    pub async fn reset_usage(&self) -> Result<(), QuotaError> {
        self.usage.reset_all().await
    }

    async fn entitlement_for_gating(
        &self,
    ) -> Result<(EntitlementSnapshot, Option<QuotaError>), QuotaError> {
        let cached = self.cache.get().await?;

        let (snapshot, warning) = if self.staleness.needs_refresh(&cached, self.clock.now()) {
            match self.cache.refresh().await {
                Ok(outcome) => (outcome.snapshot, outcome.warning),
                Err(err) => {
                    tracing::warn!(error = %err, "could not store refreshed entitlement");
                    (cached, Some(err))
                }
            }
        } else {
            (cached, None)
        };

        Ok((self.staleness.apply(&snapshot, self.clock.now()), warning))
    }
}
