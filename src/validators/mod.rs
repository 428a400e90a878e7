//! Form validation for the login and registration screens.
//!
//! The session manager trusts its inputs; callers run these checks before
//! invoking it.

pub mod email;
pub mod name;
pub mod password;

pub use email::validate_email;
pub use name::validate_display_name;
pub use password::{PasswordPolicy, validate_password, validate_password_confirmation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordEmpty,
    PasswordTooShort(usize),
    PasswordTooLong(usize),
    PasswordConfirmationEmpty,
    PasswordMismatch,
    NameEmpty,
    NameTooShort,
    NameTooLong,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email is required"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Please enter a valid email"),
            Self::PasswordEmpty => write!(f, "Password is required"),
            Self::PasswordTooShort(min) => {
                write!(f, "Password must be at least {min} characters")
            }
            Self::PasswordTooLong(max) => {
                write!(f, "Password is too long (max {max} characters)")
            }
            Self::PasswordConfirmationEmpty => write!(f, "Please confirm your password"),
            Self::PasswordMismatch => write!(f, "Passwords do not match"),
            Self::NameEmpty => write!(f, "Display name is required"),
            Self::NameTooShort => write!(f, "Display name must be at least 2 characters"),
            Self::NameTooLong => write!(f, "Display name is too long (max 100 characters)"),
        }
    }
}

impl std::error::Error for ValidationError {}
