//! Durable Store Port - key/value persistence that survives restarts.
//!
//! Values are opaque bytes. Callers own the encoding (JSON for the counters
//! and the entitlement snapshot) and the decision of what to do with bytes
//! that no longer decode.

use async_trait::async_trait;

use crate::domain::foundation::QuotaError;

/// Key holding the per-day usage counters.
pub const USAGE_COUNTERS_KEY: &str = "usage_counters";

/// Key holding the cached entitlement snapshot.
pub const ENTITLEMENT_SNAPSHOT_KEY: &str = "entitlement_snapshot";

/// Errors that can occur during durable store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurableStoreError {
    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Key contains characters the backend cannot store.
    #[error("invalid key '{0}'")]
    InvalidKey(String),
}

impl DurableStoreError {
    pub fn read(key: &str, reason: impl ToString) -> Self {
        Self::Read {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: &str, reason: impl ToString) -> Self {
        Self::Write {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<DurableStoreError> for QuotaError {
    fn from(err: DurableStoreError) -> Self {
        match err {
            DurableStoreError::Read { .. } => QuotaError::read_failed(err.to_string()),
            DurableStoreError::Write { .. } | DurableStoreError::InvalidKey(_) => {
                QuotaError::write_failed(err.to_string())
            }
        }
    }
}

/// Port for the durable key/value store.
///
/// A `set` that returns `Ok` must be visible to every later `get`, including
/// after a process restart.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Load the bytes under `key`. `Ok(None)` if nothing was ever stored.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DurableStoreError>;

    /// Replace the bytes under `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), DurableStoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), DurableStoreError>;
}
