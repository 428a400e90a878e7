use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{InMemoryKeyValueStore, KeyValueStore, StoreError};

/// In-memory store whose reads, writes and removals can be switched to fail.
///
/// Unlike the collaborator mocks the switches stay on until turned off, since
/// one session transition touches several keys.
#[derive(Clone, Default)]
pub struct MockKeyValueStore {
    pub inner: InMemoryKeyValueStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_removes: Arc<AtomicBool>,
}

impl MockKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Io(format!("injected {what} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MockKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        Self::check(&self.fail_removes, "remove")?;
        self.inner.remove(key).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        Self::check(&self.fail_removes, "remove")?;
        self.inner.multi_remove(keys).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Self::check(&self.fail_reads, "read")?;
        self.inner.keys().await
    }
}
