//! File-based key-value storage.
//!
//! Stores each key as a file in a directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{KeyValueStore, StoreError};

const VALUE_EXTENSION: &str = "value";
const KEY_EXTENSION: &str = "key";
const HASHED_PREFIX: &str = "h-";

/// Longest key stored under its hex-encoded name. Longer keys would push the
/// file name past the usual 255-byte limit.
const MAX_HEX_KEY_LEN: usize = 100;

/// File-based key-value storage.
///
/// Each key is stored as `{hex(key)}.value` in the configured directory, so
/// no key can name a path outside it. Keys longer than 100 bytes are stored
/// as `h-{sha256(key)}.value` with the key itself in a `.key` file next to it.
/// Writes go to a temporary file first and are renamed into place.
///
/// # Example
///
/// ```rust,ignore
/// use pantry::FileKeyValueStore;
///
/// let store = FileKeyValueStore::new("/data/food_explorer/store")?;
/// ```
pub struct FileKeyValueStore {
    directory: PathBuf,
}

impl FileKeyValueStore {
    /// Creates the store, creating the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)
            .map_err(|e| StoreError::Io(format!("Failed to create store directory: {e}")))?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn stem(key: &str) -> String {
        if key.len() <= MAX_HEX_KEY_LEN {
            hex::encode(key)
        } else {
            format!("{HASHED_PREFIX}{}", hex::encode(Sha256::digest(key.as_bytes())))
        }
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{VALUE_EXTENSION}", Self::stem(key)))
    }

    /// Sidecar holding the original key, only for hashed names.
    fn key_path(&self, key: &str) -> Option<PathBuf> {
        (key.len() > MAX_HEX_KEY_LEN).then(|| {
            self.directory
                .join(format!("{}.{KEY_EXTENSION}", Self::stem(key)))
        })
    }

    fn remove_entry(&self, key: &str) -> Result<(), StoreError> {
        Self::remove_file(&self.value_path(key))?;
        match self.key_path(key) {
            Some(path) => Self::remove_file(&path),
            None => Ok(()),
        }
    }

    fn key_for_stem(&self, stem: &str) -> Option<String> {
        if stem.starts_with(HASHED_PREFIX) {
            let path = self.directory.join(format!("{stem}.{KEY_EXTENSION}"));
            return std::fs::read_to_string(path).ok();
        }
        hex::decode(stem)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    fn remove_file(path: &Path) -> Result<(), StoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(format!("Failed to delete value file: {e}"))),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.value_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(format!("Failed to read value file: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if let Some(key_path) = self.key_path(key) {
            std::fs::write(&key_path, key)
                .map_err(|e| StoreError::Io(format!("Failed to write key file: {e}")))?;
        }

        let path = self.value_path(key);
        let tmp = path.with_extension(format!("{VALUE_EXTENSION}.tmp"));

        std::fs::write(&tmp, value)
            .map_err(|e| StoreError::Io(format!("Failed to write value file: {e}")))?;
        std::fs::rename(&tmp, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Io(format!("Failed to move value file into place: {e}"))
        })
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_entry(key)
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        // attempt every key, report the first failure
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.remove_entry(key) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = std::fs::read_dir(&self.directory)
            .map_err(|e| StoreError::Io(format!("Failed to read store directory: {e}")))?;

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != VALUE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(key) = self.key_for_stem(stem) {
                keys.push(key);
            }
        }

        Ok(keys)
    }
}
