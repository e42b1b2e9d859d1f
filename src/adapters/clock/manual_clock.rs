//! Hand-driven clock for tests and simulations.

use chrono::{Duration, FixedOffset, Offset, Utc};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::foundation::{DayKey, Timestamp};
use crate::ports::Clock;

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Starts at `start`, with days bucketed in UTC.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            offset: Utc.fix(),
        }
    }

    /// Buckets days at `offset` instead of UTC.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn set(&self, at: Timestamp) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.plus(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn day_key(&self, at: Timestamp) -> DayKey {
        DayKey::from_date(at.local_date(&self.offset))
    }
}
