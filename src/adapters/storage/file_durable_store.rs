//! File-based Durable Store Adapter
//!
//! One file per key under a base directory. Writes go to a sibling temp file
//! that is then renamed over the target, so a crash mid-write leaves either
//! the old value or the new one.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{DurableStore, DurableStoreError};

/// File-based durable key/value store
#[derive(Debug, Clone)]
pub struct FileDurableStore {
    base_path: PathBuf,
}

impl FileDurableStore {
    /// Create a store rooted at `base_path`. The directory is created lazily.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileDurableStore::new("./data/recipe-gate");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, DurableStoreError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!(".{}.tmp", key))
    }
}

/// Keys become file names: ASCII alphanumerics, `_` and `-` only.
fn validate_key(key: &str) -> Result<(), DurableStoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DurableStoreError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl DurableStore for FileDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DurableStoreError> {
        let path = self.value_path(key)?;

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DurableStoreError::read(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), DurableStoreError> {
        let path = self.value_path(key)?;

        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| DurableStoreError::write(key, e))?;

        let temp = self.temp_path(key);
        fs::write(&temp, value)
            .await
            .map_err(|e| DurableStoreError::write(key, e))?;

        fs::rename(&temp, &path)
            .await
            .map_err(|e| DurableStoreError::write(key, e))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DurableStoreError> {
        let path = self.value_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DurableStoreError::write(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_key_reads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileDurableStore::new(dir.path());

        assert_eq!(store.get("usage_counters").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_returns_bytes() {
        let dir = TempDir::new().unwrap();
        let store = FileDurableStore::new(dir.path().join("nested"));

        store.set("usage_counters", b"{\"a\":1}").await.unwrap();

        assert_eq!(
            store.get("usage_counters").await.unwrap(),
            Some(b"{\"a\":1}".to_vec())
        );
    }

    #[tokio::test]
    async fn values_survive_a_new_store_instance() {
        let dir = TempDir::new().unwrap();
        FileDurableStore::new(dir.path())
            .set("entitlement_snapshot", b"premium")
            .await
            .unwrap();

        let reopened = FileDurableStore::new(dir.path());
        assert_eq!(
            reopened.get("entitlement_snapshot").await.unwrap(),
            Some(b"premium".to_vec())
        );
    }

    #[tokio::test]
    async fn set_overwrites_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileDurableStore::new(dir.path());

        store.set("k", b"one").await.unwrap();
        store.set("k", b"two").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
        assert!(!store.temp_path("k").exists());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileDurableStore::new(dir.path());

        store.set("k", b"v").await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileDurableStore::new(dir.path());

        let err = store.set("../escape", b"x").await.unwrap_err();
        assert_eq!(err, DurableStoreError::InvalidKey("../escape".into()));
        assert!(store.get("").await.is_err());
    }
}
