//! Key-value store trait.

use async_trait::async_trait;

use super::StoreError;

/// Byte-oriented key-value store.
///
/// Implementations:
/// - [`InMemoryKeyValueStore`](super::InMemoryKeyValueStore): process-local, for tests and previews
/// - [`FileKeyValueStore`](super::FileKeyValueStore): survives restarts
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Removes every key in `keys`. Missing keys are skipped.
    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Lists every stored key.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Serializes `value` as JSON and stores it under `key`.
pub(crate) async fn put_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: serde::Serialize + Sync + ?Sized,
{
    let bytes = serde_json::to_vec(value)?;
    store.set(key, &bytes).await
}

/// Reads and decodes a JSON value. A missing key is `Ok(None)`.
pub(crate) async fn get_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    match store.get(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}
