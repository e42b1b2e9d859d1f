//! Wall-clock adapter.

use chrono::{FixedOffset, Offset, Utc};

use crate::domain::foundation::{DayKey, Timestamp};
use crate::ports::Clock;

/// System time, bucketed into days at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Days roll over at UTC midnight.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn day_key(&self, at: Timestamp) -> DayKey {
        DayKey::from_date(at.local_date(&self.offset))
    }
}
