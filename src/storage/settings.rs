use std::sync::Arc;

use serde_json::{Map, Value};

use super::store::{get_json, put_json};
use super::{KeyValueStore, StorageKeys, StoreError};

/// App settings kept as one JSON object under the settings key.
pub struct SettingsStore<S> {
    store: Arc<S>,
    key: String,
}

impl<S> Clone for SettingsStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
        }
    }
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: Arc<S>, keys: &StorageKeys) -> Self {
        Self {
            store,
            key: keys.settings.clone(),
        }
    }

    /// Returns the stored settings, or an empty object when none are stored.
    pub async fn get(&self) -> Result<Map<String, Value>, StoreError> {
        let settings: Option<Map<String, Value>> = get_json(self.store.as_ref(), &self.key).await?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn get_value(&self, name: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get().await?.remove(name))
    }

    /// Replaces all settings.
    pub async fn set(&self, settings: &Map<String, Value>) -> Result<(), StoreError> {
        put_json(self.store.as_ref(), &self.key, settings).await
    }

    /// Shallow merge: top-level entries of `changes` overwrite stored ones,
    /// nested objects are replaced whole. Returns the merged settings.
    pub async fn update(
        &self,
        changes: Map<String, Value>,
    ) -> Result<Map<String, Value>, StoreError> {
        let mut settings = self.get().await?;
        settings.extend(changes);
        self.set(&settings).await?;

        log::debug!(
            target: "pantry::storage",
            "msg=\"settings updated\", entries={}",
            settings.len()
        );

        Ok(settings)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::InMemoryKeyValueStore;

    fn settings() -> SettingsStore<InMemoryKeyValueStore> {
        SettingsStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            &StorageKeys::default(),
        )
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn test_empty_by_default() {
        assert!(settings().get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_is_shallow_merge() {
        let settings = settings();
        settings
            .set(&object(json!({
                "theme": "dark",
                "units": {"weight": "grams", "volume": "ml"}
            })))
            .await
            .unwrap();

        let merged = settings
            .update(object(json!({"units": {"weight": "ounces"}, "language": "fr"})))
            .await
            .unwrap();

        assert_eq!(merged["theme"], "dark");
        assert_eq!(merged["language"], "fr");
        assert_eq!(merged["units"], json!({"weight": "ounces"}));
        assert_eq!(settings.get().await.unwrap(), merged);
    }

    #[tokio::test]
    async fn test_get_value_and_clear() {
        let settings = settings();
        settings
            .update(object(json!({"theme": "light"})))
            .await
            .unwrap();

        assert_eq!(
            settings.get_value("theme").await.unwrap(),
            Some(json!("light"))
        );
        assert_eq!(settings.get_value("missing").await.unwrap(), None);

        settings.clear().await.unwrap();
        assert!(settings.get().await.unwrap().is_empty());
    }
}
