//! Configuration for the session core.
//!
//! # Example
//!
//! ```rust
//! use pantry::config::{PantryConfig, RecoveryMode, StorageConfig};
//! use chrono::Duration;
//!
//! // Use defaults
//! let config = PantryConfig::default();
//!
//! // Or customize
//! let config = PantryConfig {
//!     recovery: RecoveryMode::Follow,
//!     storage: StorageConfig {
//!         namespace: "recipes_dev".to_owned(),
//!         cache_ttl: Duration::minutes(10),
//!     },
//! };
//! ```

use chrono::Duration;

use crate::storage::StorageKeys;

/// Top-level configuration consumed by [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone, Default)]
pub struct PantryConfig {
    /// How startup recovery treats the session-change subscription.
    pub recovery: RecoveryMode,

    /// Local storage layout.
    pub storage: StorageConfig,
}

impl PantryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Development preset.
    ///
    /// Keeps following remote session changes and uses a separate storage
    /// namespace with short-lived cache entries.
    pub fn development() -> Self {
        Self {
            recovery: RecoveryMode::Follow,
            storage: StorageConfig {
                namespace: "food_explorer_dev".to_owned(),
                cache_ttl: Duration::minutes(5),
            },
        }
    }

    /// Storage keys derived from the configured namespace.
    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(&self.storage.namespace)
    }
}

/// How [`recover_session`](crate::SessionManager::recover_session) uses the
/// provider's session-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Resolve the first notification, then drop the subscription.
    #[default]
    FirstEvent,

    /// Resolve the first notification, then keep applying later ones for
    /// the lifetime of the manager. A server-side sign-out logs the user out
    /// locally.
    Follow,
}

/// Local storage layout.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Prefix for every key the crate writes.
    ///
    /// Default: `food_explorer`
    pub namespace: String,

    /// Default lifetime of [`CacheStore`](crate::CacheStore) entries.
    ///
    /// Default: 1 hour
    pub cache_ttl: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: "food_explorer".to_owned(),
            cache_ttl: Duration::hours(1),
        }
    }
}
