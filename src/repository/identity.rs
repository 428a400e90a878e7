use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::ProviderError;
use crate::Password;

/// The authenticated principal returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "uid")]
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            photo_url: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Session state as the provider sees it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RemoteAuthState {
    /// The provider has not restored its persisted session yet.
    #[default]
    Pending,
    SignedIn(Identity),
    SignedOut,
}

impl RemoteAuthState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::Pending | Self::SignedOut => None,
        }
    }
}

/// Session-change subscription. Dropping the receiver unsubscribes.
pub type SessionChanges = watch::Receiver<RemoteAuthState>;

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Creates an identity and signs it in.
    async fn create_identity(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<Identity, ProviderError>;

    /// Signs in an existing identity.
    async fn authenticate(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<Identity, ProviderError>;

    /// Signs out the current identity.
    async fn revoke_session(&self) -> Result<(), ProviderError>;

    /// Sets the display name on the provider-side identity record.
    async fn set_display_name(
        &self,
        identity_id: &str,
        display_name: &str,
    ) -> Result<(), ProviderError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    /// Subscribes to session-state changes.
    ///
    /// The receiver starts at the provider's current state, which may still
    /// be [`RemoteAuthState::Pending`].
    fn subscribe_session_changes(&self) -> SessionChanges;
}
