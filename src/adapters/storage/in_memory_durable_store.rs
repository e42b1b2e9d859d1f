//! In-Memory Durable Store Adapter
//!
//! Keeps values in a shared map. Useful for tests and development, with
//! switches for failed reads/writes and slow writes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::ports::{DurableStore, DurableStoreError};

/// In-memory durable store
///
/// Clones share the same map and switches.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDurableStore {
    values: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_delay: Duration,
    writes: Arc<AtomicUsize>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps this long inside every `set`, before the value lands.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Make every following `get` fail (or stop failing).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every following `set` and `delete` fail (or stop failing).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store bytes directly, bypassing failure switches (e.g. corrupt data).
    pub async fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.into());
    }

    /// Bytes currently stored under `key`.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.values.read().await.get(key).cloned()
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DurableStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DurableStoreError::read(key, "injected read failure"));
        }
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), DurableStoreError> {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DurableStoreError::write(key, "injected write failure"));
        }

        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DurableStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DurableStoreError::write(key, "injected write failure"));
        }
        self.values.write().await.remove(key);
        Ok(())
    }
}
