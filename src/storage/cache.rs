use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::store::{get_json, put_json};
use super::{KeyValueStore, StorageKeys, StoreError};

/// Stored form of a cache value: the data plus when it was written and for
/// how long it stays fresh, both in milliseconds.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    timestamp: i64,
    ttl: i64,
}

impl<T> CacheEntry<T> {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.timestamp > self.ttl
    }
}

/// Time-limited cache entries stored under the cache key prefix.
///
/// Expired entries are removed the first time they are read.
pub struct CacheStore<S> {
    store: Arc<S>,
    keys: StorageKeys,
    default_ttl: Duration,
}

impl<S> Clone for CacheStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

impl<S: KeyValueStore> CacheStore<S> {
    pub fn new(store: Arc<S>, keys: StorageKeys, default_ttl: Duration) -> Self {
        Self {
            store,
            keys,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Caches `data` for the default TTL.
    pub async fn set<T>(&self, key: &str, data: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        self.set_with_ttl(key, data, self.default_ttl).await
    }

    pub async fn set_with_ttl<T>(&self, key: &str, data: &T, ttl: Duration) -> Result<(), StoreError>
    where
        T: Serialize + Sync,
    {
        let entry = CacheEntry {
            data,
            timestamp: Utc::now().timestamp_millis(),
            ttl: ttl.num_milliseconds(),
        };
        put_json(self.store.as_ref(), &self.keys.cache_key(key), &entry).await
    }

    /// Returns the cached value, or `None` when missing or expired.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let cache_key = self.keys.cache_key(key);
        let Some(entry) = get_json::<_, CacheEntry<T>>(self.store.as_ref(), &cache_key).await?
        else {
            return Ok(None);
        };

        if entry.is_expired_at(Utc::now()) {
            log::debug!(
                target: "pantry::storage",
                "msg=\"cache entry expired\", key={key}"
            );
            self.store.remove(&cache_key).await?;
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store.remove(&self.keys.cache_key(key)).await
    }

    /// Removes every cache entry. Returns how many were removed.
    pub async fn clear_all(&self) -> Result<usize, StoreError> {
        let cache_keys: Vec<String> = self
            .store
            .keys()
            .await?
            .into_iter()
            .filter(|key| self.keys.is_cache_key(key))
            .collect();

        let refs: Vec<&str> = cache_keys.iter().map(String::as_str).collect();
        self.store.multi_remove(&refs).await?;
        Ok(cache_keys.len())
    }
}
