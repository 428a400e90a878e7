use std::fmt;

/// Error as reported by a remote collaborator.
///
/// `code` is the provider's machine-readable code (`auth/wrong-password`,
/// `permission-denied`, ...). Convert into [`AuthError`](crate::AuthError)
/// to get the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: String,
    pub detail: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
        }
    }
}

impl std::error::Error for ProviderError {}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}
