//! In-flight purchase or restore transaction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, TransactionId};

/// What a transaction is doing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase { product_id: String },
    Restore,
}

impl TransactionKind {
    pub fn purchase(product_id: impl Into<String>) -> Self {
        Self::Purchase {
            product_id: product_id.into(),
        }
    }

    /// Short label for logs and `TransactionInProgress` errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Purchase { .. } => "purchase",
            Self::Restore => "restore",
        }
    }

    pub fn product_id(&self) -> Option<&str> {
        match self {
            Self::Purchase { product_id } => Some(product_id),
            Self::Restore => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchase { product_id } => write!(f, "purchase({})", product_id),
            Self::Restore => write!(f, "restore"),
        }
    }
}

/// A single purchase or restore attempt.
///
/// At most one exists at a time; concurrent identical requests share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub started_at: Timestamp,
}

impl Transaction {
    pub fn start(kind: TransactionKind, started_at: Timestamp) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            started_at,
        }
    }

    /// True if a new request for `kind` may join this transaction.
    pub fn is_joinable_by(&self, kind: &TransactionKind) -> bool {
        &self.kind == kind
    }
}
