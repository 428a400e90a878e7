#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::Password;
use crate::crypto::{digest_password, generate_identity_id};

use super::identity::{Identity, IdentityProvider, RemoteAuthState, SessionChanges};
use super::ProviderError;

/// Operations of [`MockIdentityProvider`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    CreateIdentity,
    Authenticate,
    RevokeSession,
    SetDisplayName,
    SendPasswordReset,
}

#[derive(Debug, Clone)]
pub struct MockAccount {
    pub identity: Identity,
    pub password_digest: String,
    pub disabled: bool,
}

/// In-memory identity provider.
///
/// Behaves like the hosted provider for the codes the app cares about
/// (`email-already-in-use`, `weak-password`, `user-not-found`,
/// `wrong-password`, `user-disabled`) and lets tests inject a one-shot
/// failure for any operation with [`fail_next`](Self::fail_next).
#[derive(Clone)]
pub struct MockIdentityProvider {
    pub accounts: Arc<Mutex<Vec<MockAccount>>>,
    pub password_resets: Arc<Mutex<Vec<String>>>,
    state: Arc<watch::Sender<RemoteAuthState>>,
    failures: Arc<Mutex<HashMap<ProviderOp, String>>>,
}

impl MockIdentityProvider {
    /// A provider that has already resolved to "signed out".
    pub fn new() -> Self {
        Self::with_state(RemoteAuthState::SignedOut)
    }

    /// A provider that has not restored its persisted session yet.
    pub fn pending() -> Self {
        Self::with_state(RemoteAuthState::Pending)
    }

    fn with_state(state: RemoteAuthState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            accounts: Arc::new(Mutex::new(vec![])),
            password_resets: Arc::new(Mutex::new(vec![])),
            state: Arc::new(sender),
            failures: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Makes the next call of `op` fail with `code`.
    pub fn fail_next(&self, op: ProviderOp, code: impl Into<String>) {
        self.failures.lock().unwrap().insert(op, code.into());
    }

    fn take_failure(&self, op: ProviderOp) -> Result<(), ProviderError> {
        match self.failures.lock().unwrap().remove(&op) {
            Some(code) => Err(ProviderError::new(code, format!("injected failure for {op:?}"))),
            None => Ok(()),
        }
    }

    /// Seeds an account without signing it in.
    pub fn add_account(&self, email: &str, password: &str) -> Identity {
        let identity = Identity::new(generate_identity_id(), email);
        self.accounts.lock().unwrap().push(MockAccount {
            identity: identity.clone(),
            password_digest: digest_password(password),
            disabled: false,
        });
        identity
    }

    pub fn disable(&self, email: &str) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.identity.email == email) {
            account.disabled = true;
        }
    }

    /// Simulates the provider restoring or establishing a session on its own.
    pub fn sign_in_externally(&self, identity: Identity) {
        self.state.send_replace(RemoteAuthState::SignedIn(identity));
    }

    /// Simulates a server-side session invalidation.
    pub fn sign_out_externally(&self) {
        self.state.send_replace(RemoteAuthState::SignedOut);
    }

    pub fn current_state(&self) -> RemoteAuthState {
        self.state.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<Identity, ProviderError> {
        self.take_failure(ProviderOp::CreateIdentity)?;

        if password.char_len() < 6 {
            return Err(ProviderError::new(
                "auth/weak-password",
                "password must be at least 6 characters",
            ));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.identity.email == email) {
            return Err(ProviderError::new(
                "auth/email-already-in-use",
                format!("{email} is taken"),
            ));
        }

        let identity = Identity::new(generate_identity_id(), email);
        accounts.push(MockAccount {
            identity: identity.clone(),
            password_digest: digest_password(password.expose_secret()),
            disabled: false,
        });
        drop(accounts);

        self.state
            .send_replace(RemoteAuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<Identity, ProviderError> {
        self.take_failure(ProviderOp::Authenticate)?;

        let accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.iter().find(|a| a.identity.email == email) else {
            return Err(ProviderError::new("auth/user-not-found", email.to_owned()));
        };

        if account.disabled {
            return Err(ProviderError::new("auth/user-disabled", email.to_owned()));
        }

        if account.password_digest != digest_password(password.expose_secret()) {
            return Err(ProviderError::new("auth/wrong-password", email.to_owned()));
        }

        let identity = account.identity.clone();
        drop(accounts);

        self.state
            .send_replace(RemoteAuthState::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn revoke_session(&self) -> Result<(), ProviderError> {
        self.take_failure(ProviderOp::RevokeSession)?;
        self.state.send_replace(RemoteAuthState::SignedOut);
        Ok(())
    }

    async fn set_display_name(
        &self,
        identity_id: &str,
        display_name: &str,
    ) -> Result<(), ProviderError> {
        self.take_failure(ProviderOp::SetDisplayName)?;

        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.iter_mut().find(|a| a.identity.id == identity_id) else {
            return Err(ProviderError::new("auth/user-not-found", identity_id.to_owned()));
        };
        account.identity.display_name = Some(display_name.to_owned());
        let identity = account.identity.clone();
        drop(accounts);

        // keep the signed-in copy in step, like the hosted provider does
        self.state.send_if_modified(|state| match state {
            RemoteAuthState::SignedIn(current) if current.id == identity.id => {
                *current = identity;
                true
            }
            _ => false,
        });
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        self.take_failure(ProviderOp::SendPasswordReset)?;

        let known = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.identity.email == email);
        if !known {
            return Err(ProviderError::new("auth/user-not-found", email.to_owned()));
        }

        self.password_resets.lock().unwrap().push(email.to_owned());
        Ok(())
    }

    fn subscribe_session_changes(&self) -> SessionChanges {
        self.state.subscribe()
    }
}
