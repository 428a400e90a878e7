//! Follow mode: applying remote session changes after recovery.

use std::sync::Arc;

use super::SessionManager;
use crate::{IdentityProvider, KeyValueStore, ProfileRepository, RemoteAuthState, SessionChanges};

impl<P: IdentityProvider, R: ProfileRepository, S: KeyValueStore> SessionManager<P, R, S> {
    /// Spawns the task that applies later notifications from `changes`.
    ///
    /// The task holds only a weak reference and stops once every manager
    /// clone is dropped or the provider closes the channel.
    pub(super) fn follow(&self, mut changes: SessionChanges) {
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let manager = SessionManager { inner };
                let _guard = manager.inner.transition.lock().await;
                // read under the lock so a transition that signed in and then
                // rolled back is seen in its final state
                let state = changes.borrow_and_update().clone();
                manager.apply_remote_change(state).await;
            }

            log::debug!(
                target: "pantry::session",
                "msg=\"stopped following session changes\""
            );
        });

        if let Ok(mut follower) = self.inner.follower.lock() {
            if let Some(previous) = follower.replace(handle) {
                previous.abort();
            }
        }
    }

    /// A remote sign-out ends a local session; a remote sign-in of a
    /// different identity replaces it. Anything else is already reflected.
    ///
    /// The caller holds the transition lock.
    async fn apply_remote_change(&self, state: RemoteAuthState) {
        let current = self.snapshot();

        match state {
            RemoteAuthState::SignedOut if current.logged_in => {
                log::info!(
                    target: "pantry::session",
                    "msg=\"signed out remotely\""
                );
                self.reset().await;
            }
            RemoteAuthState::SignedIn(identity)
                if current.identity_id() != Some(identity.id.as_str()) =>
            {
                log::info!(
                    target: "pantry::session",
                    "msg=\"signed in remotely\", identity_id={}",
                    identity.id
                );
                self.adopt(identity).await;
            }
            RemoteAuthState::Pending
            | RemoteAuthState::SignedIn(_)
            | RemoteAuthState::SignedOut => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        InMemoryKeyValueStore, MockIdentityProvider, MockProfileRepository, PantryConfig,
        RecoveryMode, Session,
    };

    type Manager = SessionManager<MockIdentityProvider, MockProfileRepository, InMemoryKeyValueStore>;

    fn following() -> (MockIdentityProvider, Manager) {
        let provider = MockIdentityProvider::new();
        let config = PantryConfig {
            recovery: RecoveryMode::Follow,
            ..PantryConfig::default()
        };
        let manager = SessionManager::new(
            provider.clone(),
            MockProfileRepository::new(),
            Arc::new(InMemoryKeyValueStore::new()),
            config,
        );
        (provider, manager)
    }

    #[tokio::test]
    async fn test_follower_stops_when_manager_dropped() {
        let (provider, manager) = following();
        manager.recover_session().await;

        assert!(manager.is_following());
        assert_eq!(provider.subscriber_count(), 1);

        drop(manager);
        // the aborted task releases its receiver once the runtime polls it
        for _ in 0..10 {
            if provider.subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(provider.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_sign_in_of_same_identity_is_ignored() {
        let (provider, manager) = following();
        let identity = provider.add_account("cook@example.com", "hunter22");
        provider.sign_in_externally(identity.clone());
        manager.recover_session().await;

        let sessions = manager.subscribe();

        manager.apply_remote_change(RemoteAuthState::SignedIn(identity)).await;
        assert!(!sessions.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_remote_sign_out_while_logged_out_is_ignored() {
        let (_, manager) = following();
        manager.recover_session().await;

        manager.apply_remote_change(RemoteAuthState::SignedOut).await;
        assert_eq!(manager.snapshot(), Session::default());
    }
}
