//! Gating verdict value object.

use serde::{Deserialize, Serialize};

/// Quota left once the checked action has been performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remaining {
    Unlimited,
    Count(u32),
}

/// Allow/deny answer for one metered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    pub remaining: Remaining,
}

impl Verdict {
    pub fn unlimited() -> Self {
        Self {
            allowed: true,
            remaining: Remaining::Unlimited,
        }
    }

    pub fn allowed_with(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining: Remaining::Count(remaining),
        }
    }

    pub fn denied() -> Self {
        Self {
            allowed: false,
            remaining: Remaining::Count(0),
        }
    }

    pub fn is_denied(&self) -> bool {
        !self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_has_zero_remaining() {
        let verdict = Verdict::denied();
        assert!(verdict.is_denied());
        assert_eq!(verdict.remaining, Remaining::Count(0));
    }

    #[test]
    fn unlimited_has_no_count() {
        assert_eq!(Verdict::unlimited().remaining, Remaining::Unlimited);
    }

    #[test]
    fn verdict_serializes_for_the_ui() {
        let json = serde_json::to_string(&Verdict::allowed_with(4)).unwrap();
        assert_eq!(json, r#"{"allowed":true,"remaining":{"count":4}}"#);
    }
}
