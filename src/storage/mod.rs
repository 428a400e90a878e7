//! Local key-value storage.
//!
//! The session core mirrors remote session state into a small key-value
//! store so the app can show something before the provider answers. Any
//! backend works as long as it implements [`KeyValueStore`].
//!
//! | Type | Description |
//! |------|-------------|
//! | [`KeyValueStore`] | Byte store trait |
//! | [`InMemoryKeyValueStore`] | Process-local backend |
//! | [`FileKeyValueStore`] | One file per key in a directory |
//! | [`StorageKeys`] | Namespaced key names |
//! | [`LocalMirror`] | Typed access to the mirrored session keys |
//! | [`SettingsStore`] | App settings with shallow merge |
//! | [`CacheStore`] | TTL cache entries |

mod cache;
mod file_store;
mod keys;
mod memory_store;
mod mirror;
#[cfg(any(test, feature = "mocks"))]
mod mock;
mod settings;
mod store;

pub use cache::CacheStore;
pub use file_store::FileKeyValueStore;
pub use keys::StorageKeys;
pub use memory_store::InMemoryKeyValueStore;
pub use mirror::{LocalMirror, MirrorRecord};
#[cfg(any(test, feature = "mocks"))]
pub use mock::MockKeyValueStore;
pub use settings::SettingsStore;
pub use store::KeyValueStore;

use std::fmt;

/// Failure of a local storage operation.
///
/// Never crosses the [`SessionManager`](crate::SessionManager) boundary:
/// the manager logs it and flags the session as mirror-degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Io(String),
    Serialization(String),
    LockPoisoned,
}

impl std::error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "storage I/O error: {msg}"),
            Self::Serialization(msg) => write!(f, "storage serialization error: {msg}"),
            Self::LockPoisoned => write!(f, "storage lock poisoned"),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
