//! # pantry
//!
//! Session core for the Food Explorer recipe app.
//!
//! `pantry` keeps three views of "who is logged in" in step: the remote
//! identity provider, a local key-value mirror used for offline startup, and
//! the in-memory [`Session`] snapshot the UI renders from.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`session`] | [`SessionManager`] and the [`Session`] snapshot |
//! | [`repository`] | Remote identity and profile collaborator traits |
//! | [`storage`] | Local key-value store trait, backends and typed wrappers |
//! | [`events`] | Listener registry for session events |
//! | [`credentials`] | [`Password`], [`Credentials`], [`Registration`] |
//! | [`validators`] | Form validation helpers for callers |
//! | [`config`] | [`PantryConfig`] |

pub mod config;
pub mod credentials;
#[cfg(any(test, feature = "mocks"))]
pub mod crypto;
pub mod events;
pub mod repository;
pub mod session;
pub mod storage;
pub mod validators;

use std::fmt;

pub use config::{PantryConfig, RecoveryMode, StorageConfig};
pub use credentials::{Credentials, Password, Registration};
pub use events::register_event_listeners;
pub use repository::{
    Identity, IdentityProvider, ProfileDocument, ProfileRepository, ProfileUpdate, ProviderError,
    RemoteAuthState, SessionChanges,
};
#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockIdentityProvider, MockProfileRepository, ProfileOp, ProviderOp};
pub use session::{Session, SessionManager};
#[cfg(any(test, feature = "mocks"))]
pub use storage::MockKeyValueStore;
pub use storage::{
    CacheStore, FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, LocalMirror,
    MirrorRecord, SettingsStore, StorageKeys, StoreError,
};

/// Error codes reported by the remote identity provider.
///
/// Codes arrive as strings (`auth/wrong-password`, `permission-denied`, ...)
/// and are parsed once into this enum; anything unrecognised is kept
/// verbatim in [`AuthErrorCode::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidEmail,
    TooManyRequests,
    NetworkRequestFailed,
    UserDisabled,
    OperationNotAllowed,
    InvalidCredential,
    PermissionDenied,
    /// An operation needed a signed-in user and there was none.
    NoCurrentUser,
    Unknown(String),
}

impl AuthErrorCode {
    /// Parses a provider code. Only the exact strings the provider emits are
    /// recognised: `auth/`-prefixed codes plus the profile store's bare
    /// `permission-denied`. Anything else is [`AuthErrorCode::Unknown`].
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/weak-password" => Self::WeakPassword,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/too-many-requests" => Self::TooManyRequests,
            "auth/network-request-failed" => Self::NetworkRequestFailed,
            "auth/user-disabled" => Self::UserDisabled,
            "auth/operation-not-allowed" => Self::OperationNotAllowed,
            "auth/invalid-credential" => Self::InvalidCredential,
            "permission-denied" => Self::PermissionDenied,
            "auth/no-current-user" => Self::NoCurrentUser,
            _ => Self::Unknown(code.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserNotFound => "auth/user-not-found",
            Self::WrongPassword => "auth/wrong-password",
            Self::EmailAlreadyInUse => "auth/email-already-in-use",
            Self::WeakPassword => "auth/weak-password",
            Self::InvalidEmail => "auth/invalid-email",
            Self::TooManyRequests => "auth/too-many-requests",
            Self::NetworkRequestFailed => "auth/network-request-failed",
            Self::UserDisabled => "auth/user-disabled",
            Self::OperationNotAllowed => "auth/operation-not-allowed",
            Self::InvalidCredential => "auth/invalid-credential",
            Self::PermissionDenied => "permission-denied",
            Self::NoCurrentUser => "auth/no-current-user",
            Self::Unknown(raw) => raw,
        }
    }

    /// User-facing message for this code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::UserNotFound => "No account found with this email address.",
            Self::WrongPassword => "Incorrect password. Please try again.",
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::WeakPassword => "Password should be at least 6 characters long.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::TooManyRequests => "Too many failed attempts. Please try again later.",
            Self::NetworkRequestFailed => "Network error. Please check your connection.",
            Self::UserDisabled => "This account has been disabled.",
            Self::OperationNotAllowed => "This operation is not allowed.",
            Self::InvalidCredential => "Invalid credentials.",
            Self::PermissionDenied => "Access denied. Please check your permissions.",
            Self::NoCurrentUser => "Please sign in to continue.",
            Self::Unknown(_) => "An error occurred. Please try again.",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned to callers of the session operations.
///
/// `message` is always the table message for `code`, never the provider's
/// raw detail text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode) -> Self {
        let message = code.message().to_owned();
        Self { code, message }
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        Self::new(AuthErrorCode::from_code(&err.code))
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
