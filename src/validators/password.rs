use super::ValidationError;

/// Length rules for passwords, counted in characters.
///
/// # Examples
///
/// ```
/// use pantry::validators::PasswordPolicy;
///
/// // Default policy: 6-128 characters, matching the provider's own minimum
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("pesto1").is_ok());
/// assert!(policy.validate("basil").is_err());
///
/// let longer = PasswordPolicy::new().min(10);
/// assert!(longer.validate("pesto1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum password length (default: 6)
    pub min_length: usize,
    /// Maximum password length (default: 128)
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 128,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    #[must_use]
    pub fn max(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    /// Validates a password against this policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::PasswordEmpty);
        }

        let len = password.chars().count();
        if len < self.min_length {
            return Err(ValidationError::PasswordTooShort(self.min_length));
        }

        if len > self.max_length {
            return Err(ValidationError::PasswordTooLong(self.max_length));
        }

        Ok(())
    }
}

/// Validates a password using the default policy (6-128 characters).
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    PasswordPolicy::default().validate(password)
}

/// Checks the "confirm password" field of the registration form.
pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if confirmation.is_empty() {
        return Err(ValidationError::PasswordConfirmationEmpty);
    }

    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_valid_passwords() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("123456").is_ok());
        assert!(policy.validate("saffron-risotto").is_ok());
    }

    #[test]
    fn test_password_empty() {
        assert_eq!(
            validate_password("").unwrap_err(),
            ValidationError::PasswordEmpty
        );
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("12345").unwrap_err(),
            ValidationError::PasswordTooShort(6)
        );
    }

    #[test]
    fn test_length_counts_characters() {
        // six characters, more than six bytes
        assert!(validate_password("äöüäöü").is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(129);
        assert_eq!(
            validate_password(&long_password).unwrap_err(),
            ValidationError::PasswordTooLong(128)
        );
    }

    #[test]
    fn test_custom_bounds() {
        let policy = PasswordPolicy::new().min(8).max(10);
        assert!(policy.validate("12345678").is_ok());
        assert_eq!(
            policy.validate("1234567").unwrap_err(),
            ValidationError::PasswordTooShort(8)
        );
        assert_eq!(
            policy.validate("12345678901").unwrap_err(),
            ValidationError::PasswordTooLong(10)
        );
    }

    #[test]
    fn test_confirmation() {
        assert!(validate_password_confirmation("hunter22", "hunter22").is_ok());
        assert_eq!(
            validate_password_confirmation("hunter22", "").unwrap_err(),
            ValidationError::PasswordConfirmationEmpty
        );
        assert_eq!(
            validate_password_confirmation("hunter22", "hunter23").unwrap_err(),
            ValidationError::PasswordMismatch
        );
    }
}
