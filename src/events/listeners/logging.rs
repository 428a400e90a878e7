use async_trait::async_trait;

use crate::events::{Listener, SessionEvent};

/// Logs every session event through the `log` crate.
///
/// Failed logins and a degraded mirror are logged at `Warn` whatever the
/// configured level; everything else at the configured level.
///
/// # Example
///
/// ```rust,ignore
/// use pantry::register_event_listeners;
/// use pantry::events::listeners::LoggingListener;
///
/// register_event_listeners(|registry| {
///     registry.listen(LoggingListener::with_level(log::Level::Debug));
/// });
/// ```
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    /// Logs at `Info`.
    pub fn new() -> Self {
        Self::with_level(log::Level::Info)
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }

    fn level_for(&self, event: &SessionEvent) -> log::Level {
        match event {
            SessionEvent::RegistrationFailed { .. }
            | SessionEvent::LoginFailed { .. }
            | SessionEvent::MirrorDegraded { .. } => {
                log::Level::Warn.min(self.level)
            }
            _ => self.level,
        }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &SessionEvent) {
        log::log!(
            target: "pantry::events",
            self.level_for(event),
            "event={} at={} {:?}",
            event.name(),
            event.timestamp().to_rfc3339(),
            event
        );
    }
}
