//! Error types for the domain layer.
//!
//! `QuotaError` is the single taxonomy every I/O-touching component returns.
//! The gating policy itself never fails.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Stable machine-readable codes for quota errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    StorageCorrupt,
    StorageReadFailed,
    StorageWriteFailed,
    ProviderUnreachable,
    ProviderRejected,
    PurchaseCancelled,
    TransactionTimeout,
    TransactionInProgress,
    InvalidStateTransition,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::StorageCorrupt => "STORAGE_CORRUPT",
            ErrorCode::StorageReadFailed => "STORAGE_READ_FAILED",
            ErrorCode::StorageWriteFailed => "STORAGE_WRITE_FAILED",
            ErrorCode::ProviderUnreachable => "PROVIDER_UNREACHABLE",
            ErrorCode::ProviderRejected => "PROVIDER_REJECTED",
            ErrorCode::PurchaseCancelled => "PURCHASE_CANCELLED",
            ErrorCode::TransactionTimeout => "TRANSACTION_TIMEOUT",
            ErrorCode::TransactionInProgress => "TRANSACTION_IN_PROGRESS",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
        };
        write!(f, "{}", s)
    }
}

/// Quota and entitlement errors.
///
/// | Error | Retryable | Surfaced to UI |
/// |-------|-----------|----------------|
/// | StorageCorrupt | - | no (self-healed, logged) |
/// | StorageReadFailed | yes | yes |
/// | StorageWriteFailed | yes | yes |
/// | ProviderUnreachable | yes | soft warning |
/// | ProviderRejected | no | yes |
/// | PurchaseCancelled | no | yes |
/// | TransactionTimeout | no | yes (as a rejection) |
/// | TransactionInProgress | yes | yes |
/// | InvalidTransition | no | yes |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    /// Persisted bytes under `key` could not be decoded.
    #[error("stored value under '{key}' is corrupt: {reason}")]
    StorageCorrupt { key: String, reason: String },

    #[error("storage read failed: {0}")]
    StorageReadFailed(String),

    /// The write did not commit; the in-memory change is discarded.
    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("entitlement provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("entitlement provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("purchase cancelled by user")]
    PurchaseCancelled,

    /// The watchdog resolved a transaction that never completed.
    #[error("transaction timed out after {timeout_secs}s")]
    TransactionTimeout { timeout_secs: u64 },

    /// A different purchase or restore already holds the single-flight slot.
    #[error("another {kind} transaction is already in progress")]
    TransactionInProgress { kind: String },

    #[error("invalid entitlement transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl QuotaError {
    pub fn storage_corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        QuotaError::StorageCorrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn read_failed(reason: impl Into<String>) -> Self {
        QuotaError::StorageReadFailed(reason.into())
    }

    pub fn write_failed(reason: impl Into<String>) -> Self {
        QuotaError::StorageWriteFailed(reason.into())
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        QuotaError::ProviderUnreachable(reason.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        QuotaError::ProviderRejected(reason.into())
    }

    pub fn invalid_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        QuotaError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            QuotaError::StorageCorrupt { .. } => ErrorCode::StorageCorrupt,
            QuotaError::StorageReadFailed(_) => ErrorCode::StorageReadFailed,
            QuotaError::StorageWriteFailed(_) => ErrorCode::StorageWriteFailed,
            QuotaError::ProviderUnreachable(_) => ErrorCode::ProviderUnreachable,
            QuotaError::ProviderRejected(_) => ErrorCode::ProviderRejected,
            QuotaError::PurchaseCancelled => ErrorCode::PurchaseCancelled,
            QuotaError::TransactionTimeout { .. } => ErrorCode::TransactionTimeout,
            QuotaError::TransactionInProgress { .. } => ErrorCode::TransactionInProgress,
            QuotaError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
        }
    }

    /// Returns true if the same call may succeed when simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuotaError::StorageReadFailed(_)
                | QuotaError::StorageWriteFailed(_)
                | QuotaError::ProviderUnreachable(_)
                | QuotaError::TransactionInProgress { .. }
        )
    }

    /// Returns true for failures that count as a rejected attempt.
    ///
    /// A watchdog timeout is reported exactly like a provider rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            QuotaError::ProviderRejected(_) | QuotaError::TransactionTimeout { .. }
        )
    }
}
