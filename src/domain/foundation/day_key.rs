//! Calendar day key used to scope daily counters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Canonical calendar day (ISO `YYYY-MM-DD`) that a set of counters applies to.
///
/// Produced by a `Clock`, which decides the timezone. Two instants map to the
/// same key exactly when they fall on the same local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Wraps a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("day_key", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_iso_date() {
        let key = DayKey::from_date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(key.to_string(), "2024-03-07");
    }

    #[test]
    fn parses_iso_date() {
        let key: DayKey = "2024-03-07".parse().unwrap();
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!("yesterday".parse::<DayKey>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let key: DayKey = "2024-03-07".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-03-07\"");
    }
}
