//! Results of a completed transaction.

use serde::{Deserialize, Serialize};

use super::TransactionKind;
use crate::domain::entitlement::EntitlementSnapshot;
use crate::domain::foundation::TransactionId;

/// How a transaction ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "snapshot", rename_all = "snake_case")]
pub enum TransactionOutcome {
    /// Purchase went through; the snapshot has been committed.
    Purchased(EntitlementSnapshot),
    /// Restore found a paid entitlement; the snapshot has been committed.
    Restored(EntitlementSnapshot),
    /// Restore found nothing. The cached entitlement was left as it was.
    NothingToRestore,
}

impl TransactionOutcome {
    /// The committed snapshot, if this outcome produced one.
    pub fn snapshot(&self) -> Option<&EntitlementSnapshot> {
        match self {
            Self::Purchased(snapshot) | Self::Restored(snapshot) => Some(snapshot),
            Self::NothingToRestore => None,
        }
    }
}

/// What every caller attached to a transaction receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,
    pub kind: TransactionKind,
    pub outcome: TransactionOutcome,
}
