use std::sync::OnceLock;

use super::{Listener, SessionEvent};

static REGISTRY: OnceLock<EventRegistry> = OnceLock::new();

/// Listeners that receive every [`SessionEvent`], in registration order.
///
/// Built once by [`register_event_listeners`].
pub struct EventRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl EventRegistry {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn listen(&mut self, listener: impl Listener) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    async fn notify(&self, event: &SessionEvent) {
        for listener in &self.listeners {
            listener.handle(event).await;
        }
    }
}

/// Installs the process-wide listeners.
///
/// Only the first call takes effect; later calls log a warning. Until it is
/// called every event is dropped.
///
/// # Example
///
/// ```rust,ignore
/// use pantry::register_event_listeners;
/// use pantry::events::listeners::LoggingListener;
///
/// register_event_listeners(|registry| {
///     registry.listen(LoggingListener::new());
/// });
/// ```
pub fn register_event_listeners<F>(f: F)
where
    F: FnOnce(&mut EventRegistry),
{
    let mut registry = EventRegistry::new();
    f(&mut registry);
    let count = registry.len();

    if REGISTRY.set(registry).is_err() {
        log::warn!(
            target: "pantry::events",
            "msg=\"listeners already registered, ignoring\""
        );
        return;
    }

    log::debug!(
        target: "pantry::events",
        "msg=\"listeners registered\", count={count}"
    );
}

/// Sends `event` to every registered listener. No-op before registration.
pub async fn dispatch(event: SessionEvent) {
    if let Some(registry) = REGISTRY.get() {
        registry.notify(&event).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    struct Tagged {
        tag: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Listener for Tagged {
        async fn handle(&self, event: &SessionEvent) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.tag, event.name()));
        }
    }

    #[tokio::test]
    async fn test_listeners_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = EventRegistry::new();
        assert!(registry.is_empty());

        registry
            .listen(Tagged {
                tag: "first",
                seen: Arc::clone(&seen),
            })
            .listen(Tagged {
                tag: "second",
                seen: Arc::clone(&seen),
            });
        assert_eq!(registry.len(), 2);

        registry
            .notify(&SessionEvent::SessionCleared { at: Utc::now() })
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:session.cleared", "second:session.cleared"]
        );
    }
}
