//! In-memory key-value storage.
//!
//! Suitable for tests, previews, and platforms without a writable disk.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{KeyValueStore, StoreError};

/// In-memory key-value storage.
///
/// Values live in a `HashMap` behind a `RwLock` and are lost when the
/// process exits. For persistent storage use
/// [`FileKeyValueStore`](super::FileKeyValueStore).
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .remove(key);
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryKeyValueStore::new();

        store.set("token", b"uid123").await.unwrap();

        assert_eq!(store.get("token").await.unwrap(), Some(b"uid123".to_vec()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_replaces() {
        let store = InMemoryKeyValueStore::new();

        store.set("token", b"old").await.unwrap();
        store.set("token", b"new").await.unwrap();

        assert_eq!(store.get("token").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.remove("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_multi_remove() {
        let store = InMemoryKeyValueStore::new();
        store.set("a", b"1").await.unwrap();
        store.set("b", b"2").await.unwrap();
        store.set("c", b"3").await.unwrap();

        store.multi_remove(&["a", "b", "missing"]).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["c".to_owned()]);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = InMemoryKeyValueStore::new();
        let clone = store.clone();

        clone.set("token", b"uid123").await.unwrap();

        assert!(!store.is_empty());
    }
}
