use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Identity, ProviderError};

/// Durable profile record stored by the remote document store.
///
/// Fields the crate does not know about are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(rename = "uid")]
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileDocument {
    /// Builds the document written at registration.
    ///
    /// The display name falls back to the identity's own, then to the local
    /// part of the email address.
    pub fn for_new_identity(
        identity: &Identity,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let display_name = display_name
            .filter(|name| !name.trim().is_empty())
            .map(str::to_owned)
            .or_else(|| identity.display_name.clone())
            .unwrap_or_else(|| email_local_part(&identity.email).to_owned());

        Self {
            identity_id: identity.id.clone(),
            email: identity.email.clone(),
            display_name,
            photo_url: identity.photo_url.clone(),
            created_at: now,
            last_login: now,
            is_active: true,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(display_name) = &update.display_name {
            display_name.clone_into(&mut self.display_name);
        }
        if let Some(photo_url) = &update.photo_url {
            self.photo_url = Some(photo_url.clone());
        }
        if let Some(last_login) = update.last_login {
            self.last_login = last_login;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(updated_at) = update.updated_at {
            self.updated_at = Some(updated_at);
        }
        for (key, value) in &update.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Partial update of a [`ProfileDocument`]. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProfileUpdate {
    /// Update applied on every successful sign-in.
    pub fn login_stamp(now: DateTime<Utc>) -> Self {
        Self {
            last_login: Some(now),
            is_active: Some(true),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.photo_url.is_none()
            && self.last_login.is_none()
            && self.is_active.is_none()
            && self.updated_at.is_none()
            && self.extra.is_empty()
    }
}

#[async_trait]
pub trait ProfileRepository: Send + Sync + 'static {
    /// Creates or replaces the profile for an identity.
    async fn put_profile(
        &self,
        identity_id: &str,
        profile: &ProfileDocument,
    ) -> Result<(), ProviderError>;

    async fn get_profile(
        &self,
        identity_id: &str,
    ) -> Result<Option<ProfileDocument>, ProviderError>;

    /// Applies a partial update. Fails if the profile does not exist.
    async fn update_profile(
        &self,
        identity_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ProviderError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<ProfileDocument>, ProviderError>;
}
