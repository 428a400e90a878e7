//! The in-memory session and the manager that owns it.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Snapshot of who is logged in |
//! | [`SessionManager`] | Runs register, login, logout and recovery |

mod follow;
mod manager;

pub use manager::SessionManager;

use crate::{Identity, ProfileDocument};

/// Authoritative record of who is logged in.
///
/// Owned by [`SessionManager`] and replaced whole on every transition.
/// `Session::default()` is the initial, logged-out state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub logged_in: bool,
    pub identity: Option<Identity>,
    pub profile: Option<ProfileDocument>,
    /// True while a register, login, logout or recovery is in flight.
    pub loading: bool,
    pub last_error: Option<String>,
    /// The last register, login, logout or recovery could not fully write or
    /// clear the local mirror. Later profile writes only ever set it.
    pub mirror_degraded: bool,
}

impl Session {
    pub(crate) fn signed_in(
        identity: Identity,
        profile: Option<ProfileDocument>,
        mirror_degraded: bool,
    ) -> Self {
        Self {
            logged_in: true,
            identity: Some(identity),
            profile,
            loading: false,
            last_error: None,
            mirror_degraded,
        }
    }

    pub(crate) fn signed_out(mirror_degraded: bool) -> Self {
        Self {
            mirror_degraded,
            ..Self::default()
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            last_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn identity_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.id.as_str())
    }

    /// True for the state a fresh manager starts in.
    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}
