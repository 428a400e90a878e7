//! Identifier and digest helpers for the in-memory collaborators.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of identity ids handed out by [`MockIdentityProvider`](crate::MockIdentityProvider).
pub const IDENTITY_ID_LENGTH: usize = 28;

/// Generates a random alphanumeric identifier.
pub fn generate_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// Generates an identity id of the provider's usual length.
pub fn generate_identity_id() -> String {
    generate_id(IDENTITY_ID_LENGTH)
}

/// SHA-256 hex digest of a password, so mock accounts never hold plaintext.
pub fn digest_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
