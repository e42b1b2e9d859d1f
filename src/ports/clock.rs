//! Clock port - the only source of "now" and of the local calendar day.
//!
//! Counters roll over on the user's local date, so the day key comes from the
//! clock rather than from UTC.

use crate::domain::foundation::{DayKey, Timestamp};

/// Wall clock with a notion of the user's local day.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Timestamp;

    /// Local calendar day containing `at`.
    fn day_key(&self, at: Timestamp) -> DayKey;

    /// Local calendar day containing `now()`.
    fn today(&self) -> DayKey {
        self.day_key(self.now())
    }
}
