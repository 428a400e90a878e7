use chrono::{DateTime, Utc};

/// Events emitted by [`SessionManager`](crate::SessionManager) transitions.
///
/// Always fired. With no listeners registered they are dropped. Register
/// listeners via [`register_event_listeners`](crate::register_event_listeners).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    // sign-in
    Registered {
        identity_id: String,
        email: String,
        at: DateTime<Utc>,
    },
    RegistrationFailed {
        email: String,
        code: String,
        at: DateTime<Utc>,
    },
    LoginSuccess {
        identity_id: String,
        email: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        email: String,
        code: String,
        at: DateTime<Utc>,
    },

    // sign-out
    LoggedOut {
        identity_id: Option<String>,
        at: DateTime<Utc>,
    },

    // startup recovery and follow mode
    SessionRecovered {
        identity_id: String,
        at: DateTime<Utc>,
    },
    SessionCleared {
        at: DateTime<Utc>,
    },

    // local mirror
    MirrorDegraded {
        reason: String,
        at: DateTime<Utc>,
    },

    // profile
    ProfileUpdated {
        identity_id: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "session.registered",
            Self::LoginSuccess { .. } => "session.login.success",
            Self::RegistrationFailed { .. } => "session.registration.failed",
            Self::LoginFailed { .. } => "session.login.failed",
            Self::LoggedOut { .. } => "session.logout",
            Self::SessionRecovered { .. } => "session.recovered",
            Self::SessionCleared { .. } => "session.cleared",
            Self::MirrorDegraded { .. } => "session.mirror.degraded",
            Self::ProfileUpdated { .. } => "session.profile.updated",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Registered { at, .. }
            | Self::LoginSuccess { at, .. }
            | Self::RegistrationFailed { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::LoggedOut { at, .. }
            | Self::SessionRecovered { at, .. }
            | Self::SessionCleared { at }
            | Self::MirrorDegraded { at, .. }
            | Self::ProfileUpdated { at, .. } => *at,
        }
    }
}
