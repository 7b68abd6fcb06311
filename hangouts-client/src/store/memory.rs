//! In-memory storage backend.

use super::KeyValueStore;
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory key-value store.
///
/// Clones share the same map, so a test can keep a handle and inspect raw
/// keys, or reopen a session over the same data to simulate a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    values: HashMap<String, String>,
    fail_next_write: Option<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a raw value without going through the async trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().ok()?.values.get(key).cloned()
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .map(|inner| inner.values.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Cause the next `set()` or `remove()` to fail with the given reason.
    pub fn fail_next_write(&self, reason: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_next_write = Some(reason.to_string());
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if let Some(reason) = inner.fail_next_write.take() {
            return Err(StorageError::Unavailable(reason));
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if let Some(reason) = inner.fail_next_write.take() {
            return Err(StorageError::Unavailable(reason));
        }
        inner.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "[1]").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("[1]".to_string()));
        assert_eq!(store.raw("k"), Some("[1]".to_string()));
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.remove("nothing").await.unwrap();
        assert!(store.get("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("a", "1").await.unwrap();
        assert_eq!(other.keys(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn forced_write_failure_is_one_shot() {
        let store = MemoryStore::new();
        store.fail_next_write("quota exceeded");

        let result = store.set("k", "v").await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(store.raw("k").is_none());

        store.set("k", "v").await.unwrap();
        assert_eq!(store.raw("k"), Some("v".to_string()));
    }
}
