//! Per-day usage counter record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::MeteredAction;
use crate::domain::foundation::DayKey;

/// Counters for every metered action on one calendar day.
///
/// Counts only grow within a `day_key`. A different day is represented by a
/// brand-new zeroed record, never by mutating this one backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    day_key: DayKey,
    #[serde(default)]
    counts: BTreeMap<MeteredAction, u32>,
}

impl UsageCounters {
    /// Zeroed counters for the given day.
    pub fn fresh(day_key: DayKey) -> Self {
        Self {
            day_key,
            counts: BTreeMap::new(),
        }
    }

    pub fn day_key(&self) -> DayKey {
        self.day_key
    }

    /// Current count for an action. Absent entries read as zero.
    pub fn count(&self, action: MeteredAction) -> u32 {
        self.counts.get(&action).copied().unwrap_or(0)
    }

    /// True if these counters apply to `today`.
    pub fn is_for(&self, today: DayKey) -> bool {
        self.day_key == today
    }

    /// Bumps one action by one and returns the new count.
    pub fn increment(&mut self, action: MeteredAction) -> u32 {
        let slot = self.counts.entry(action).or_insert(0);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Non-zero counts, ordered by action.
    pub fn counts(&self) -> &BTreeMap<MeteredAction, u32> {
        &self.counts
    }
}
