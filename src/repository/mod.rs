//! Remote collaborator traits and data types.
//!
//! The identity provider and the profile document store are external
//! services. Implement these traits to plug in a real backend.
//!
//! # Traits
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`IdentityProvider`] | Sign-up, sign-in, sign-out and session-change notifications |
//! | [`ProfileRepository`] | Profile documents keyed by identity id |
//!
//! # Data Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Identity`] | Authenticated principal |
//! | [`RemoteAuthState`] | Provider-side session state |
//! | [`ProfileDocument`] | Durable profile record |
//! | [`ProfileUpdate`] | Partial profile update |
//! | [`ProviderError`] | Raw error code and detail from the provider |
//!
//! # Mock Implementations
//!
//! Enable the `mocks` feature for in-memory implementations useful for testing:
//!
//! - [`MockIdentityProvider`]
//! - [`MockProfileRepository`]

mod error;
mod identity;
mod profile;

#[cfg(any(test, feature = "mocks"))]
mod identity_mock;
#[cfg(any(test, feature = "mocks"))]
mod profile_mock;

pub use error::ProviderError;
pub use identity::{Identity, IdentityProvider, RemoteAuthState, SessionChanges};
pub use profile::{ProfileDocument, ProfileRepository, ProfileUpdate};

#[cfg(any(test, feature = "mocks"))]
pub use identity_mock::{MockAccount, MockIdentityProvider, ProviderOp};
#[cfg(any(test, feature = "mocks"))]
pub use profile_mock::{MockProfileRepository, ProfileOp};
