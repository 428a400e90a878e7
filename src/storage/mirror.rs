use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::store::{get_json, put_json};
use super::{KeyValueStore, StorageKeys, StoreError};
use crate::ProfileDocument;

/// What the local mirror holds for a signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorRecord {
    /// Identity id of the signed-in user.
    pub token: String,
    pub profile: ProfileDocument,
    pub last_login_at: DateTime<Utc>,
}

/// Typed access to the session keys of a [`KeyValueStore`].
///
/// Values are stored as JSON: the token as a string, the profile as an
/// object, the last-login time as epoch milliseconds.
pub struct LocalMirror<S> {
    store: Arc<S>,
    keys: StorageKeys,
}

impl<S> Clone for LocalMirror<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
        }
    }
}

impl<S: KeyValueStore> LocalMirror<S> {
    pub fn new(store: Arc<S>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub async fn set_token(&self, identity_id: &str) -> Result<(), StoreError> {
        put_json(self.store.as_ref(), &self.keys.token, identity_id).await
    }

    pub async fn token(&self) -> Result<Option<String>, StoreError> {
        get_json(self.store.as_ref(), &self.keys.token).await
    }

    pub async fn set_profile(&self, profile: &ProfileDocument) -> Result<(), StoreError> {
        put_json(self.store.as_ref(), &self.keys.user_data, profile).await
    }

    pub async fn profile(&self) -> Result<Option<ProfileDocument>, StoreError> {
        get_json(self.store.as_ref(), &self.keys.user_data).await
    }

    /// Removes a stored profile, leaving token and last-login alone.
    pub async fn clear_profile(&self) -> Result<(), StoreError> {
        self.store.remove(&self.keys.user_data).await
    }

    pub async fn set_last_login(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        put_json(
            self.store.as_ref(),
            &self.keys.last_login,
            &at.timestamp_millis(),
        )
        .await
    }

    pub async fn last_login(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let millis: Option<i64> = get_json(self.store.as_ref(), &self.keys.last_login).await?;
        match millis {
            Some(millis) => DateTime::from_timestamp_millis(millis)
                .map(Some)
                .ok_or_else(|| {
                    StoreError::Serialization(format!("last login out of range: {millis}"))
                }),
            None => Ok(None),
        }
    }

    /// Reads the full record. `None` unless token, profile and last-login
    /// are all present.
    pub async fn load(&self) -> Result<Option<MirrorRecord>, StoreError> {
        let token = self.token().await?;
        let profile = self.profile().await?;
        let last_login_at = self.last_login().await?;

        Ok(match (token, profile, last_login_at) {
            (Some(token), Some(profile), Some(last_login_at)) => Some(MirrorRecord {
                token,
                profile,
                last_login_at,
            }),
            _ => None,
        })
    }

    /// True when a complete record is stored. Read failures count as absent.
    pub async fn is_populated(&self) -> bool {
        matches!(self.load().await, Ok(Some(_)))
    }

    /// Removes every session key, leaving settings and cache entries alone.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.multi_remove(&self.keys.session_keys()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Identity, InMemoryKeyValueStore};

    fn mirror() -> (Arc<InMemoryKeyValueStore>, LocalMirror<InMemoryKeyValueStore>) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let mirror = LocalMirror::new(Arc::clone(&store), StorageKeys::default());
        (store, mirror)
    }

    fn profile() -> ProfileDocument {
        ProfileDocument::for_new_identity(
            &Identity::new("uid123", "cook@example.com"),
            Some("Cook"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_full_record_round_trip() {
        let (_, mirror) = mirror();
        let at = DateTime::from_timestamp_millis(1_714_557_600_000).unwrap();

        mirror.set_token("uid123").await.unwrap();
        mirror.set_profile(&profile()).await.unwrap();
        mirror.set_last_login(at).await.unwrap();

        let record = mirror.load().await.unwrap().unwrap();
        assert_eq!(record.token, "uid123");
        assert_eq!(record.profile.display_name, "Cook");
        assert_eq!(record.last_login_at, at);
        assert!(mirror.is_populated().await);
    }

    #[tokio::test]
    async fn test_values_are_json_encoded() {
        let (store, mirror) = mirror();
        mirror.set_token("uid123").await.unwrap();

        let raw = store.get("food_explorer_token").await.unwrap().unwrap();
        assert_eq!(raw, b"\"uid123\"".to_vec());
    }

    #[tokio::test]
    async fn test_partial_record_is_not_populated() {
        let (_, mirror) = mirror();
        mirror.set_token("uid123").await.unwrap();
        mirror.set_last_login(Utc::now()).await.unwrap();

        assert!(mirror.load().await.unwrap().is_none());
        assert!(!mirror.is_populated().await);
    }

    #[tokio::test]
    async fn test_clear_keeps_settings() {
        let (store, mirror) = mirror();
        mirror.set_token("uid123").await.unwrap();
        mirror.set_profile(&profile()).await.unwrap();
        mirror.set_last_login(Utc::now()).await.unwrap();
        store.set("food_explorer_refresh_token", b"\"r\"").await.unwrap();
        store.set("food_explorer_settings", b"{}").await.unwrap();

        mirror.clear().await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["food_explorer_settings".to_owned()]);
    }

    #[tokio::test]
    async fn test_corrupt_value_is_an_error() {
        let (store, mirror) = mirror();
        store.set("food_explorer_user_data", b"not json").await.unwrap();

        assert!(matches!(
            mirror.profile().await,
            Err(StoreError::Serialization(_))
        ));
        assert!(!mirror.is_populated().await);
    }
}
