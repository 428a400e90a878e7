//! Credential types passed into the session operations.

use std::fmt;

use crate::validators::{
    ValidationError, validate_display_name, validate_email, validate_password,
};

/// A password that never shows up in logs.
///
/// `Debug` and `Display` print `[REDACTED]`. Not serializable.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Exposes the raw password for the provider call.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Login form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Password,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<Password>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Runs the login form checks. Returns the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_password(self.password.expose_secret())
    }
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: Password,
    pub display_name: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<Password>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }

    /// Runs the registration form checks in on-screen order: name, email,
    /// password.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_display_name(&self.display_name)?;
        validate_email(&self.email)?;
        validate_password(self.password.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_redacted() {
        let password = Password::new("hunter22");
        assert_eq!(format!("{password:?}"), "Password([REDACTED])");
        assert_eq!(format!("{password}"), "[REDACTED]");
        assert_eq!(password.expose_secret(), "hunter22");
    }

    #[test]
    fn test_password_char_len_counts_chars() {
        assert_eq!(Password::new("pässwörd").char_len(), 8);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("cook@example.com", "hunter22");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("cook@example.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_credentials_validate() {
        assert!(Credentials::new("cook@example.com", "hunter22").validate().is_ok());
        assert_eq!(
            Credentials::new("cook@example.com", "abc").validate().unwrap_err(),
            ValidationError::PasswordTooShort(6)
        );
        assert_eq!(
            Credentials::new("not-an-email", "hunter22").validate().unwrap_err(),
            ValidationError::EmailInvalidFormat
        );
    }

    #[test]
    fn test_registration_validate_order() {
        let registration = Registration::new("bad", "x", "A");
        assert_eq!(
            registration.validate().unwrap_err(),
            ValidationError::NameTooShort
        );

        let registration = Registration::new("cook@example.com", "hunter22", "Julia");
        assert!(registration.validate().is_ok());
    }
}
