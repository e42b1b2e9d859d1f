//! Integration tests for daily quota gating.
//!
//! Drives `EntitlementGate` end to end with an in-memory (or temp-dir) store,
//! a hand-driven clock and a scripted entitlement provider.

use chrono::{Duration, FixedOffset};
use std::sync::Arc;
use tempfile::TempDir;

use recipe_gate::adapters::{FileDurableStore, InMemoryDurableStore, ManualClock, MockEntitlementProvider};
use recipe_gate::application::{EntitlementGate, GateSettings};
use recipe_gate::domain::entitlement::{
    EntitlementSnapshot, EntitlementStatus, EntitlementTier, StalePolicy, StalenessPolicy,
};
use recipe_gate::domain::foundation::{ErrorCode, Timestamp};
use recipe_gate::domain::gating::Remaining;
use recipe_gate::domain::usage::MeteredAction;
use recipe_gate::ports::{ProviderError, ENTITLEMENT_SNAPSHOT_KEY, USAGE_COUNTERS_KEY};

// =============================================================================
// Test Infrastructure
// =============================================================================

// 2024-06-01T10:00:00Z
const T: i64 = 1_717_236_000;

struct Harness {
    gate: Arc<EntitlementGate>,
    store: InMemoryDurableStore,
    provider: MockEntitlementProvider,
    clock: ManualClock,
}

fn harness_with(settings: GateSettings) -> Harness {
    let store = InMemoryDurableStore::new();
    let provider = MockEntitlementProvider::new();
    let clock = ManualClock::new(Timestamp::from_unix_secs(T));
    let gate = EntitlementGate::new(
        Arc::new(store.clone()),
        Arc::new(provider.clone()),
        Arc::new(clock.clone()),
        settings,
    );
    Harness {
        gate: Arc::new(gate),
        store,
        provider,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(GateSettings::default())
}

async fn seed_snapshot(store: &InMemoryDurableStore, snapshot: &EntitlementSnapshot) {
    store
        .insert_raw(ENTITLEMENT_SNAPSHOT_KEY, serde_json::to_vec(snapshot).unwrap())
        .await;
}

fn cached_premium(fetched_at: Timestamp, expires_at: Option<Timestamp>) -> EntitlementSnapshot {
    EntitlementSnapshot {
        tier: EntitlementTier::Premium,
        expires_at,
        will_renew: true,
        fetched_at: Some(fetched_at),
        is_sandbox_or_mock: false,
        product_id: Some("premium_monthly".to_string()),
        ever_premium: true,
    }
}

// =============================================================================
// Daily Limits
// =============================================================================

#[tokio::test]
async fn free_tier_gets_ten_recipe_views() {
    let h = harness();

    for call in 1..=10u32 {
        let result = h.gate.can_perform(MeteredAction::RecipeView).await.unwrap();
        assert!(result.allowed(), "call {} should be allowed", call);
        assert_eq!(result.verdict.remaining, Remaining::Count(10 - call));

        let count = h.gate.record_usage(MeteredAction::RecipeView).await.unwrap();
        assert_eq!(count, call);
    }

    let eleventh = h.gate.can_perform(MeteredAction::RecipeView).await.unwrap();
    assert!(!eleventh.allowed());
    assert_eq!(eleventh.verdict.remaining, Remaining::Count(0));
}

#[tokio::test]
async fn actions_have_independent_allowances() {
    let h = harness();
    for _ in 0..10 {
        h.gate.record_usage(MeteredAction::RecipeView).await.unwrap();
    }

    let search = h.gate.can_perform(MeteredAction::Search).await.unwrap();

    assert!(search.allowed());
    assert_eq!(search.verdict.remaining, Remaining::Count(19));
}

#[tokio::test]
async fn day_rollover_resets_counters() {
    let h = harness();
    for _ in 0..10 {
        h.gate.record_usage(MeteredAction::RecipeView).await.unwrap();
    }
    assert!(!h.gate.can_perform(MeteredAction::RecipeView).await.unwrap().allowed());

    h.clock.advance(Duration::days(1));

    let result = h.gate.can_perform(MeteredAction::RecipeView).await.unwrap();
    assert!(result.allowed());
    assert_eq!(result.verdict.remaining, Remaining::Count(9));
    assert_eq!(h.gate.record_usage(MeteredAction::RecipeView).await.unwrap(), 1);
}

#[tokio::test]
async fn day_rolls_over_at_local_midnight() {
    // 2024-06-01T14:30:00Z is 23:30 in Tokyo.
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let clock = ManualClock::new(Timestamp::from_unix_secs(1_717_252_200)).with_offset(tokyo);
    let gate = EntitlementGate::new(
        Arc::new(InMemoryDurableStore::new()),
        Arc::new(MockEntitlementProvider::new()),
        Arc::new(clock.clone()),
        GateSettings::default(),
    );
    for _ in 0..3 {
        gate.record_usage(MeteredAction::RecipeGeneration).await.unwrap();
    }
    assert!(!gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap().allowed());

    // 00:30 local, still June 1st in UTC.
    clock.advance(Duration::hours(1));

    assert!(gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap().allowed());
    assert_eq!(gate.usage_today().await.unwrap().day_key().to_string(), "2024-06-02");
}

#[tokio::test]
async fn concurrent_record_usage_loses_nothing() {
    let h = harness();

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let gate = h.gate.clone();
            tokio::spawn(async move { gate.record_usage(MeteredAction::Search).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let usage = h.gate.usage_today().await.unwrap();
    assert_eq!(usage.count(MeteredAction::Search), 50);
}

// =============================================================================
// Entitlement
// =============================================================================

#[tokio::test]
async fn lapsed_premium_reverts_to_free_limits() {
    let h = harness();
    let now = Timestamp::from_unix_secs(T);
    seed_snapshot(
        &h.store,
        &cached_premium(now.minus_days(40), Some(now.minus_days(1))),
    )
    .await;
    h.provider
        .set_fetch_error(ProviderError::unreachable("offline"));

    let entitlement = h.gate.current_entitlement().await.unwrap();
    assert_eq!(entitlement.tier, EntitlementTier::Expired);

    let result = h.gate.can_perform(MeteredAction::RecipeView).await.unwrap();
    assert_eq!(result.tier, EntitlementTier::Expired);
    assert_eq!(result.verdict.remaining, Remaining::Count(9));
}

#[tokio::test]
async fn premium_survives_short_outage() {
    let h = harness();
    let now = Timestamp::from_unix_secs(T);
    seed_snapshot(&h.store, &cached_premium(now.minus_days(1), None)).await;
    h.provider
        .set_fetch_error(ProviderError::unreachable("offline"));

    let result = h.gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap();

    assert_eq!(result.tier, EntitlementTier::Premium);
    assert_eq!(result.verdict.remaining, Remaining::Unlimited);
    assert_eq!(
        result.warning.map(|w| w.code()),
        Some(ErrorCode::ProviderUnreachable)
    );
}

#[tokio::test]
async fn fail_closed_reverts_after_grace() {
    let h = harness();
    let now = Timestamp::from_unix_secs(T);
    seed_snapshot(&h.store, &cached_premium(now.minus_days(4), None)).await;
    h.provider
        .set_fetch_error(ProviderError::unreachable("offline"));

    let result = h.gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap();

    assert_eq!(result.tier, EntitlementTier::Free);
    assert_eq!(result.verdict.remaining, Remaining::Count(2));
}

#[tokio::test]
async fn fail_open_keeps_premium_while_offline() {
    let h = harness_with(GateSettings {
        staleness: StalenessPolicy::new(Duration::hours(1), StalePolicy::FailOpen, Duration::zero()),
        ..GateSettings::default()
    });
    let now = Timestamp::from_unix_secs(T);
    seed_snapshot(&h.store, &cached_premium(now.minus_days(20), None)).await;
    h.provider
        .set_fetch_error(ProviderError::unreachable("offline"));

    let result = h.gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap();

    assert_eq!(result.tier, EntitlementTier::Premium);
}

#[tokio::test]
async fn reconnecting_refreshes_stale_snapshot() {
    let h = harness();
    let now = Timestamp::from_unix_secs(T);
    seed_snapshot(&h.store, &cached_premium(now.minus_days(4), None)).await;

    let result = h.gate.can_perform(MeteredAction::RecipeView).await.unwrap();

    assert_eq!(h.provider.fetch_calls(), 1);
    assert_eq!(result.tier, EntitlementTier::Free);
    assert!(result.warning.is_none());
}

#[tokio::test]
async fn rejected_provider_status_does_not_expire_premium() {
    let h = harness();
    h.provider
        .set_status(EntitlementStatus::premium("premium_annual", None));
    h.gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap();

    let trial_end = Timestamp::from_unix_secs(T).add_days(365);
    h.provider
        .set_status(EntitlementStatus::trial("premium_annual", trial_end));

    for day in 1..=5 {
        h.clock.advance(Duration::days(1));
        let result = h.gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap();
        assert_eq!(result.tier, EntitlementTier::Premium, "day {}", day);
        assert!(result.allowed());
    }
    assert_eq!(h.provider.fetch_calls(), 6);

    // Confirmed moments ago, so no refetch.
    h.gate.can_perform(MeteredAction::RecipeGeneration).await.unwrap();
    assert_eq!(h.provider.fetch_calls(), 6);
}

// =============================================================================
// Storage Failures
// =============================================================================

#[tokio::test]
async fn corrupt_counters_self_heal() {
    let h = harness();
    h.store.insert_raw(USAGE_COUNTERS_KEY, "][").await;

    let result = h.gate.can_perform(MeteredAction::Search).await.unwrap();
    assert!(result.allowed());
    assert_eq!(h.gate.record_usage(MeteredAction::Search).await.unwrap(), 1);
}

#[tokio::test]
async fn write_failure_is_retryable_and_not_counted() {
    let h = harness();
    h.gate.record_usage(MeteredAction::RecipeView).await.unwrap();

    h.store.fail_writes(true);
    let err = h.gate.record_usage(MeteredAction::RecipeView).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::StorageWriteFailed);
    assert!(err.is_retryable());

    h.store.fail_writes(false);
    assert_eq!(h.gate.record_usage(MeteredAction::RecipeView).await.unwrap(), 2);
}

#[tokio::test]
async fn usage_survives_restart() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Timestamp::from_unix_secs(T));
    let build = || {
        EntitlementGate::new(
            Arc::new(FileDurableStore::new(dir.path())),
            Arc::new(MockEntitlementProvider::new()),
            Arc::new(clock.clone()),
            GateSettings::default(),
        )
    };

    let first = build();
    for _ in 0..3 {
        first.record_usage(MeteredAction::RecipeGeneration).await.unwrap();
    }
    drop(first);

    let second = build();
    let result = second.can_perform(MeteredAction::RecipeGeneration).await.unwrap();
    assert!(!result.allowed());
}
