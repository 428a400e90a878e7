use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::Session;
use crate::events::{SessionEvent, dispatch};
use crate::{
    AuthError, AuthErrorCode, CacheStore, Identity, IdentityProvider, KeyValueStore, LocalMirror,
    MirrorRecord, PantryConfig, Password, ProfileDocument, ProfileRepository, ProfileUpdate,
    RecoveryMode, RemoteAuthState, SettingsStore, StoreError,
};

pub(super) struct Inner<P, R, S> {
    pub(super) provider: P,
    pub(super) profiles: R,
    pub(super) store: Arc<S>,
    pub(super) mirror: LocalMirror<S>,
    pub(super) config: PantryConfig,
    pub(super) state: watch::Sender<Session>,
    /// Held for the whole of every transition.
    pub(super) transition: Mutex<()>,
    pub(super) follower: StdMutex<Option<JoinHandle<()>>>,
}

impl<P, R, S> Drop for Inner<P, R, S> {
    fn drop(&mut self) {
        if let Ok(follower) = self.follower.get_mut() {
            if let Some(handle) = follower.take() {
                handle.abort();
            }
        }
    }
}

/// Keeps the remote identity, the local mirror and the in-memory
/// [`Session`] in step.
///
/// Transitions (register, login, logout, recovery, profile refresh and
/// update) run one at a time; concurrent callers wait their turn in the
/// order they arrived. Cloning is cheap and clones share all state.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use pantry::{FileKeyValueStore, PantryConfig, Password, SessionManager};
///
/// let store = Arc::new(FileKeyValueStore::new("/data/food_explorer")?);
/// let manager = SessionManager::new(provider, profiles, store, PantryConfig::default());
///
/// manager.recover_session().await;
/// if !manager.snapshot().logged_in {
///     manager.login("cook@example.com", &Password::new("hunter22")).await?;
/// }
/// ```
pub struct SessionManager<P, R, S> {
    pub(super) inner: Arc<Inner<P, R, S>>,
}

impl<P, R, S> Clone for SessionManager<P, R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: IdentityProvider, R: ProfileRepository, S: KeyValueStore> SessionManager<P, R, S> {
    /// Creates a manager in the initial, logged-out state.
    ///
    /// Nothing is read from the local store here; call
    /// [`recover_session`](Self::recover_session) at startup.
    pub fn new(provider: P, profiles: R, store: Arc<S>, config: PantryConfig) -> Self {
        let mirror = LocalMirror::new(Arc::clone(&store), config.storage_keys());
        let (state, _) = watch::channel(Session::default());

        Self {
            inner: Arc::new(Inner {
                provider,
                profiles,
                store,
                mirror,
                config,
                state,
                transition: Mutex::new(()),
                follower: StdMutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &PantryConfig {
        &self.inner.config
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    pub fn profiles(&self) -> &R {
        &self.inner.profiles
    }

    pub fn mirror(&self) -> &LocalMirror<S> {
        &self.inner.mirror
    }

    /// App settings stored next to the session mirror.
    pub fn settings(&self) -> SettingsStore<S> {
        SettingsStore::new(Arc::clone(&self.inner.store), &self.inner.config.storage_keys())
    }

    /// Cache entries stored next to the session mirror, using the configured TTL.
    pub fn cache(&self) -> CacheStore<S> {
        CacheStore::new(
            Arc::clone(&self.inner.store),
            self.inner.config.storage_keys(),
            self.inner.config.storage.cache_ttl,
        )
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified whenever the session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Best-effort read of the local mirror, for offline display.
    ///
    /// Never used as the session itself. Read failures count as a miss.
    pub async fn cached_session(&self) -> Option<MirrorRecord> {
        match self.inner.mirror.load().await {
            Ok(record) => record,
            Err(err) => {
                log::warn!(
                    target: "pantry::storage",
                    "msg=\"mirror read failed\", error={err}"
                );
                None
            }
        }
    }

    /// True while follow mode is applying remote session changes.
    pub fn is_following(&self) -> bool {
        self.inner
            .follower
            .lock()
            .map(|follower| follower.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Creates an account, names it and writes its profile document.
    ///
    /// Inputs are not validated here; use [`Registration::validate`](crate::Registration::validate)
    /// in the form first.
    ///
    /// # Errors
    ///
    /// Any provider failure aborts before the local mirror is touched and
    /// is returned mapped to a user-facing message. The session then holds
    /// that message in `last_error`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "register", skip_all, err)
    )]
    pub async fn register(
        &self,
        email: &str,
        password: &Password,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let _guard = self.inner.transition.lock().await;
        self.begin();

        match self.create_account(email, password, display_name).await {
            Ok((identity, profile)) => {
                let degraded = self.write_mirror(&identity, Some(&profile)).await;
                self.publish(Session::signed_in(identity.clone(), Some(profile), degraded));

                log::info!(
                    target: "pantry::session",
                    "msg=\"registration success\", identity_id={}",
                    identity.id
                );

                dispatch(SessionEvent::Registered {
                    identity_id: identity.id.clone(),
                    email: identity.email.clone(),
                    at: Utc::now(),
                })
                .await;

                Ok(identity)
            }
            Err(err) => {
                log::warn!(
                    target: "pantry::session",
                    "msg=\"registration failed\", code={}",
                    err.code
                );
                self.publish(Session::failed(&err.message));

                dispatch(SessionEvent::RegistrationFailed {
                    email: email.to_owned(),
                    code: err.code.to_string(),
                    at: Utc::now(),
                })
                .await;

                Err(err)
            }
        }
    }

    async fn create_account(
        &self,
        email: &str,
        password: &Password,
        display_name: &str,
    ) -> Result<(Identity, ProfileDocument), AuthError> {
        let mut identity = self.inner.provider.create_identity(email, password).await?;

        let finished = async {
            self.inner
                .provider
                .set_display_name(&identity.id, display_name)
                .await?;
            identity.display_name = Some(display_name.to_owned());

            let profile =
                ProfileDocument::for_new_identity(&identity, Some(display_name), Utc::now());
            self.inner.profiles.put_profile(&identity.id, &profile).await?;
            Ok::<_, AuthError>(profile)
        }
        .await;

        match finished {
            Ok(profile) => Ok((identity, profile)),
            Err(err) => {
                self.roll_back_sign_in(&identity.id).await;
                Err(err)
            }
        }
    }

    /// Signs in and stamps the profile's last-login time.
    ///
    /// A profile that cannot be fetched afterwards leaves `profile` as
    /// `None` without failing the login.
    ///
    /// # Errors
    ///
    /// Authentication or stamp failures, mapped to a user-facing message.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn login(&self, email: &str, password: &Password) -> Result<Identity, AuthError> {
        let _guard = self.inner.transition.lock().await;
        self.begin();

        match self.sign_in(email, password).await {
            Ok((identity, profile)) => {
                let degraded = self.write_mirror(&identity, profile.as_ref()).await;
                self.publish(Session::signed_in(identity.clone(), profile, degraded));

                log::info!(
                    target: "pantry::session",
                    "msg=\"login success\", identity_id={}",
                    identity.id
                );

                dispatch(SessionEvent::LoginSuccess {
                    identity_id: identity.id.clone(),
                    email: identity.email.clone(),
                    at: Utc::now(),
                })
                .await;

                Ok(identity)
            }
            Err(err) => {
                log::warn!(
                    target: "pantry::session",
                    "msg=\"login failed\", code={}",
                    err.code
                );
                self.publish(Session::failed(&err.message));

                dispatch(SessionEvent::LoginFailed {
                    email: email.to_owned(),
                    code: err.code.to_string(),
                    at: Utc::now(),
                })
                .await;

                Err(err)
            }
        }
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &Password,
    ) -> Result<(Identity, Option<ProfileDocument>), AuthError> {
        let identity = self.inner.provider.authenticate(email, password).await?;

        let stamped = self
            .inner
            .profiles
            .update_profile(&identity.id, &ProfileUpdate::login_stamp(Utc::now()))
            .await;
        if let Err(err) = stamped {
            self.roll_back_sign_in(&identity.id).await;
            return Err(err.into());
        }

        let profile = self.fetch_profile(&identity.id).await;
        Ok((identity, profile))
    }

    /// Signs the provider back out after a transition failed past the point
    /// where the provider already considered `identity_id` signed in.
    async fn roll_back_sign_in(&self, identity_id: &str) {
        if let Err(err) = self.inner.provider.revoke_session().await {
            log::warn!(
                target: "pantry::session",
                "msg=\"remote sign-out after failed transition failed\", identity_id={identity_id}, code={}",
                err.code
            );
        }
    }

    /// Signs out. Never fails: a remote error is logged and the local
    /// session and mirror are cleared anyway. Safe to call when logged out.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all))]
    pub async fn logout(&self) {
        let _guard = self.inner.transition.lock().await;
        self.begin();

        let identity_id = self.snapshot().identity.map(|identity| identity.id);

        if let Err(err) = self.inner.provider.revoke_session().await {
            log::warn!(
                target: "pantry::session",
                "msg=\"remote sign-out failed, clearing local session\", code={}",
                err.code
            );
        }

        let degraded = self.clear_mirror().await;
        self.publish(Session::signed_out(degraded));

        log::info!(
            target: "pantry::session",
            "msg=\"logout success\""
        );

        dispatch(SessionEvent::LoggedOut {
            identity_id,
            at: Utc::now(),
        })
        .await;
    }

    /// Resolves the session at startup from the provider's first settled
    /// notification.
    ///
    /// Waits while the provider is still restoring its own session. With
    /// [`RecoveryMode::Follow`] later notifications keep being applied in a
    /// background task; otherwise the subscription is dropped here.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "recover_session", skip_all)
    )]
    pub async fn recover_session(&self) {
        let _guard = self.inner.transition.lock().await;
        self.begin();

        let mut changes = self.inner.provider.subscribe_session_changes();
        let resolved = changes
            .wait_for(RemoteAuthState::is_resolved)
            .await
            .map(|state| state.clone());

        let state = resolved.unwrap_or_else(|_| {
            log::warn!(
                target: "pantry::session",
                "msg=\"session-change channel closed before resolving, treating as signed out\""
            );
            RemoteAuthState::SignedOut
        });

        match state {
            RemoteAuthState::SignedIn(identity) => self.adopt(identity).await,
            RemoteAuthState::SignedOut | RemoteAuthState::Pending => self.reset().await,
        }

        match self.inner.config.recovery {
            RecoveryMode::FirstEvent => drop(changes),
            RecoveryMode::Follow => self.follow(changes),
        }
    }

    /// Re-fetches the current profile. Does nothing when logged out;
    /// failures are logged only.
    pub async fn refresh_profile(&self) {
        let _guard = self.inner.transition.lock().await;

        let current = self.snapshot();
        let Some(identity_id) = current.identity_id() else {
            return;
        };
        let Some(profile) = self.fetch_profile(identity_id).await else {
            return;
        };

        let degraded = match self.inner.mirror.set_profile(&profile).await {
            Ok(()) => false,
            Err(err) => self.report_mirror_failures(vec![("profile", err)]).await,
        };

        log::debug!(
            target: "pantry::session",
            "msg=\"profile refreshed\", identity_id={identity_id}"
        );

        self.inner.state.send_modify(|session| {
            session.profile = Some(profile);
            session.mirror_degraded |= degraded;
        });
    }

    /// Applies a partial profile update, stamping `updated_at`. A new
    /// display name is also pushed to the identity provider.
    ///
    /// # Errors
    ///
    /// [`AuthErrorCode::NoCurrentUser`] when logged out, otherwise the
    /// mapped provider failure. A failure keeps the session logged in and
    /// sets `last_error`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_profile", skip_all, err)
    )]
    pub async fn update_profile(
        &self,
        mut update: ProfileUpdate,
    ) -> Result<ProfileDocument, AuthError> {
        let _guard = self.inner.transition.lock().await;

        let current = self.snapshot();
        let Some(identity) = current.identity else {
            return Err(AuthError::new(AuthErrorCode::NoCurrentUser));
        };
        update.updated_at = Some(Utc::now());

        match self.push_update(&identity, &update, current.profile).await {
            Ok(profile) => {
                let degraded = match self.inner.mirror.set_profile(&profile).await {
                    Ok(()) => false,
                    Err(err) => self.report_mirror_failures(vec![("profile", err)]).await,
                };

                let renamed = update.display_name.clone();
                let stored = profile.clone();
                self.inner.state.send_modify(|session| {
                    if let (Some(identity), Some(name)) = (session.identity.as_mut(), renamed) {
                        identity.display_name = Some(name);
                    }
                    session.profile = Some(stored);
                    session.last_error = None;
                    session.mirror_degraded |= degraded;
                });

                log::info!(
                    target: "pantry::session",
                    "msg=\"profile updated\", identity_id={}",
                    identity.id
                );

                dispatch(SessionEvent::ProfileUpdated {
                    identity_id: identity.id,
                    at: Utc::now(),
                })
                .await;

                Ok(profile)
            }
            Err(err) => {
                log::warn!(
                    target: "pantry::session",
                    "msg=\"profile update failed\", code={}",
                    err.code
                );
                let message = err.message.clone();
                self.inner.state.send_modify(|session| {
                    session.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    async fn push_update(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
        cached: Option<ProfileDocument>,
    ) -> Result<ProfileDocument, AuthError> {
        self.inner
            .profiles
            .update_profile(&identity.id, update)
            .await?;

        if let Some(display_name) = &update.display_name {
            self.inner
                .provider
                .set_display_name(&identity.id, display_name)
                .await?;
        }

        match self.fetch_profile(&identity.id).await {
            Some(profile) => Ok(profile),
            None => cached
                .map(|mut profile| {
                    profile.apply(update);
                    profile
                })
                .ok_or_else(|| AuthError::new(AuthErrorCode::Unknown("not-found".to_owned()))),
        }
    }

    /// Asks the provider to email a password-reset link.
    ///
    /// # Errors
    ///
    /// The mapped provider failure, e.g. `user-not-found`.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.inner.provider.send_password_reset(email).await?;

        log::info!(
            target: "pantry::session",
            "msg=\"password reset requested\""
        );

        Ok(())
    }

    /// Whether a profile document exists for `email`.
    pub async fn is_email_registered(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.inner.profiles.find_by_email(email).await?.is_some())
    }

    pub fn clear_error(&self) {
        self.inner
            .state
            .send_if_modified(|session| session.last_error.take().is_some());
    }

    /// Marks a transition as started. Everything else stays as it was
    /// until the transition publishes its result.
    fn begin(&self) {
        self.inner.state.send_modify(|session| {
            session.loading = true;
            session.last_error = None;
        });
    }

    fn publish(&self, session: Session) {
        self.inner.state.send_replace(session);
    }

    /// Logged-in session from a remote identity, with a best-effort profile.
    pub(super) async fn adopt(&self, identity: Identity) {
        let profile = self.fetch_profile(&identity.id).await;
        let degraded = self.write_mirror(&identity, profile.as_ref()).await;
        let identity_id = identity.id.clone();

        self.publish(Session::signed_in(identity, profile, degraded));

        log::info!(
            target: "pantry::session",
            "msg=\"session recovered\", identity_id={identity_id}"
        );

        dispatch(SessionEvent::SessionRecovered {
            identity_id,
            at: Utc::now(),
        })
        .await;
    }

    /// Initial session after the provider reported no identity.
    pub(super) async fn reset(&self) {
        let degraded = self.clear_mirror().await;
        self.publish(Session::signed_out(degraded));

        log::info!(
            target: "pantry::session",
            "msg=\"no remote session, local session cleared\""
        );

        dispatch(SessionEvent::SessionCleared { at: Utc::now() }).await;
    }

    async fn fetch_profile(&self, identity_id: &str) -> Option<ProfileDocument> {
        match self.inner.profiles.get_profile(identity_id).await {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!(
                    target: "pantry::session",
                    "msg=\"profile fetch failed\", identity_id={identity_id}, code={}",
                    err.code
                );
                None
            }
        }
    }

    /// Writes token, profile and last-login as independent writes. A missing
    /// profile removes any stale one. Returns true if any write failed.
    async fn write_mirror(&self, identity: &Identity, profile: Option<&ProfileDocument>) -> bool {
        let mirror = &self.inner.mirror;
        let mut failures = Vec::new();

        if let Err(err) = mirror.set_token(&identity.id).await {
            failures.push(("token", err));
        }

        let profile_write = match profile {
            Some(profile) => mirror.set_profile(profile).await,
            None => mirror.clear_profile().await,
        };
        if let Err(err) = profile_write {
            failures.push(("profile", err));
        }

        if let Err(err) = mirror.set_last_login(Utc::now()).await {
            failures.push(("last_login", err));
        }

        self.report_mirror_failures(failures).await
    }

    /// Returns true if the clear failed.
    async fn clear_mirror(&self) -> bool {
        match self.inner.mirror.clear().await {
            Ok(()) => false,
            Err(err) => self.report_mirror_failures(vec![("session keys", err)]).await,
        }
    }

    async fn report_mirror_failures(&self, failures: Vec<(&'static str, StoreError)>) -> bool {
        if failures.is_empty() {
            return false;
        }

        for (key, err) in &failures {
            log::warn!(
                target: "pantry::storage",
                "msg=\"mirror write failed\", key={key}, error={err}"
            );
        }

        let reason = failures
            .iter()
            .map(|(key, err)| format!("{key}: {err}"))
            .collect::<Vec<_>>()
            .join("; ");

        dispatch(SessionEvent::MirrorDegraded {
            reason,
            at: Utc::now(),
        })
        .await;

        true
    }
}
