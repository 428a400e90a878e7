#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ProviderError;
use super::profile::{ProfileDocument, ProfileRepository, ProfileUpdate};

/// Operations of [`MockProfileRepository`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileOp {
    Put,
    Get,
    Update,
    FindByEmail,
}

/// In-memory profile document store keyed by identity id.
#[derive(Clone)]
pub struct MockProfileRepository {
    pub profiles: Arc<Mutex<HashMap<String, ProfileDocument>>>,
    failures: Arc<Mutex<HashMap<ProfileOp, String>>>,
}

impl MockProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Makes the next call of `op` fail with `code`.
    pub fn fail_next(&self, op: ProfileOp, code: impl Into<String>) {
        self.failures.lock().unwrap().insert(op, code.into());
    }

    fn take_failure(&self, op: ProfileOp) -> Result<(), ProviderError> {
        match self.failures.lock().unwrap().remove(&op) {
            Some(code) => Err(ProviderError::new(code, format!("injected failure for {op:?}"))),
            None => Ok(()),
        }
    }

    pub fn insert(&self, profile: ProfileDocument) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.identity_id.clone(), profile);
    }

    pub fn get(&self, identity_id: &str) -> Option<ProfileDocument> {
        self.profiles.lock().unwrap().get(identity_id).cloned()
    }
}

impl Default for MockProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn put_profile(
        &self,
        identity_id: &str,
        profile: &ProfileDocument,
    ) -> Result<(), ProviderError> {
        self.take_failure(ProfileOp::Put)?;
        self.profiles
            .lock()
            .unwrap()
            .insert(identity_id.to_owned(), profile.clone());
        Ok(())
    }

    async fn get_profile(
        &self,
        identity_id: &str,
    ) -> Result<Option<ProfileDocument>, ProviderError> {
        self.take_failure(ProfileOp::Get)?;
        Ok(self.get(identity_id))
    }

    async fn update_profile(
        &self,
        identity_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ProviderError> {
        self.take_failure(ProfileOp::Update)?;

        let mut profiles = self.profiles.lock().unwrap();
        match profiles.get_mut(identity_id) {
            Some(profile) => {
                profile.apply(update);
                Ok(())
            }
            None => Err(ProviderError::new(
                "not-found",
                format!("no profile for {identity_id}"),
            )),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<ProfileDocument>, ProviderError> {
        self.take_failure(ProfileOp::FindByEmail)?;
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.values().find(|p| p.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::Identity;

    fn profile(id: &str, email: &str) -> ProfileDocument {
        ProfileDocument::for_new_identity(&Identity::new(id, email), Some("Cook"), Utc::now())
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let repo = MockProfileRepository::new();
        repo.put_profile("uid1", &profile("uid1", "cook@example.com"))
            .await
            .unwrap();

        let found = repo.get_profile("uid1").await.unwrap();
        assert_eq!(found.map(|p| p.email), Some("cook@example.com".to_owned()));
        assert!(repo.get_profile("uid2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_profile_fails() {
        let repo = MockProfileRepository::new();
        let err = repo
            .update_profile("uid1", &ProfileUpdate::login_stamp(Utc::now()))
            .await
            .unwrap_err();
        assert_eq!(err.code, "not-found");
    }

    #[tokio::test]
    async fn test_update_applies_fields() {
        let repo = MockProfileRepository::new();
        repo.insert(profile("uid1", "cook@example.com"));

        let update = ProfileUpdate::default().with_display_name("Head Cook");
        repo.update_profile("uid1", &update).await.unwrap();

        assert_eq!(repo.get("uid1").unwrap().display_name, "Head Cook");
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let repo = MockProfileRepository::new();
        repo.insert(profile("uid1", "cook@example.com"));

        assert!(repo.find_by_email("cook@example.com").await.unwrap().is_some());
        assert!(repo.find_by_email("baker@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let repo = MockProfileRepository::new();
        repo.insert(profile("uid1", "cook@example.com"));
        repo.fail_next(ProfileOp::Get, "permission-denied");

        let err = repo.get_profile("uid1").await.unwrap_err();
        assert_eq!(err.code, "permission-denied");
        assert!(repo.get_profile("uid1").await.unwrap().is_some());
    }
}
