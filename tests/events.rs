//! Tests for session events.
//!
//! Run with: `cargo test --features mocks --test events`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

// the listener registry is process-wide and can only be set once, so every
// test shares one recording listener and runs under #[serial].

use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use pantry::events::listeners::LoggingListener;
use pantry::events::{Listener, SessionEvent};
use pantry::{
    InMemoryKeyValueStore, MockIdentityProvider, MockKeyValueStore, MockProfileRepository,
    PantryConfig, Password, SessionManager, register_event_listeners,
};
use serial_test::serial;

static RECORDED: OnceLock<Arc<Mutex<Vec<SessionEvent>>>> = OnceLock::new();

struct RecordingListener {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

#[async_trait]
impl Listener for RecordingListener {
    async fn handle(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Registers the listeners on first use and empties the record.
fn recorded() -> Arc<Mutex<Vec<SessionEvent>>> {
    let events = RECORDED.get_or_init(|| {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorder = RecordingListener {
            events: Arc::clone(&events),
        };
        register_event_listeners(|registry| {
            registry
                .listen(LoggingListener::with_level(log::Level::Debug))
                .listen(recorder);
        });
        events
    });
    events.lock().unwrap().clear();
    Arc::clone(events)
}

fn names(events: &Arc<Mutex<Vec<SessionEvent>>>) -> Vec<&'static str> {
    events.lock().unwrap().iter().map(SessionEvent::name).collect()
}

#[tokio::test]
#[serial]
async fn test_register_logout_login_events() {
    let events = recorded();
    let manager = SessionManager::new(
        MockIdentityProvider::new(),
        MockProfileRepository::new(),
        Arc::new(InMemoryKeyValueStore::new()),
        PantryConfig::default(),
    );

    manager
        .register("julia@example.com", &Password::new("bouillabaisse"), "Julia")
        .await
        .unwrap();
    manager.logout().await;
    manager
        .login("julia@example.com", &Password::new("bouillabaisse"))
        .await
        .unwrap();

    assert_eq!(
        names(&events),
        vec![
            "session.registered",
            "session.logout",
            "session.login.success"
        ]
    );
}

#[tokio::test]
#[serial]
async fn test_login_failure_event_carries_code() {
    let events = recorded();
    let manager = SessionManager::new(
        MockIdentityProvider::new(),
        MockProfileRepository::new(),
        Arc::new(InMemoryKeyValueStore::new()),
        PantryConfig::default(),
    );

    let _ = manager
        .login("nobody@example.com", &Password::new("bouillabaisse"))
        .await;

    let recorded = events.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    match &recorded[0] {
        SessionEvent::LoginFailed { email, code, .. } => {
            assert_eq!(email, "nobody@example.com");
            assert_eq!(code, "auth/user-not-found");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_registration_failure_event_carries_code() {
    let events = recorded();
    let provider = MockIdentityProvider::new();
    provider.add_account("julia@example.com", "bouillabaisse");
    let manager = SessionManager::new(
        provider,
        MockProfileRepository::new(),
        Arc::new(InMemoryKeyValueStore::new()),
        PantryConfig::default(),
    );

    let _ = manager
        .register("julia@example.com", &Password::new("bouillabaisse"), "Julia")
        .await;

    let recorded = events.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    match &recorded[0] {
        SessionEvent::RegistrationFailed { email, code, .. } => {
            assert_eq!(email, "julia@example.com");
            assert_eq!(code, "auth/email-already-in-use");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_recovery_events() {
    let events = recorded();
    let provider = MockIdentityProvider::new();
    let manager = SessionManager::new(
        provider.clone(),
        MockProfileRepository::new(),
        Arc::new(InMemoryKeyValueStore::new()),
        PantryConfig::default(),
    );

    manager.recover_session().await;

    let identity = provider.add_account("julia@example.com", "bouillabaisse");
    provider.sign_in_externally(identity);
    manager.recover_session().await;

    assert_eq!(
        names(&events),
        vec!["session.cleared", "session.recovered"]
    );
}

#[tokio::test]
#[serial]
async fn test_mirror_degraded_event() {
    let events = recorded();
    let store = Arc::new(MockKeyValueStore::new());
    store.fail_writes(true);
    let manager = SessionManager::new(
        MockIdentityProvider::new(),
        MockProfileRepository::new(),
        store,
        PantryConfig::default(),
    );

    manager
        .register("julia@example.com", &Password::new("bouillabaisse"), "Julia")
        .await
        .unwrap();

    assert_eq!(
        names(&events),
        vec!["session.mirror.degraded", "session.registered"]
    );
    let recorded = events.lock().unwrap();
    match &recorded[0] {
        SessionEvent::MirrorDegraded { reason, .. } => {
            assert!(reason.contains("token"));
            assert!(reason.contains("last_login"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
