//! Identity provider port for account management.
//!
//! The proxy delegates all authentication to an external identity
//! provider; the only operations it needs are looking a user up by email
//! and replacing their password.

use async_trait::async_trait;

/// A user account at the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityUser {
    /// Provider-assigned user id.
    pub uid: String,

    /// Account email.
    pub email: String,
}

/// Port for the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up a user by email address.
    async fn find_user_by_email(&self, email: &str) -> Result<IdentityUser, IdentityError>;

    /// Replace a user's password.
    async fn set_password(&self, uid: &str, new_password: &str) -> Result<(), IdentityError>;
}

/// Error from identity provider operations.
#[derive(Debug, Clone)]
pub struct IdentityError {
    pub code: IdentityErrorCode,
    pub message: String,
}

/// Identity provider error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityErrorCode {
    /// No account exists for the email.
    UserNotFound,

    /// The provider rejected the email as malformed.
    InvalidEmail,

    /// The provider rejected the password as too weak.
    WeakPassword,

    /// Any other provider-side failure.
    Provider,

    /// Transport failure or timeout.
    Network,
}

impl IdentityErrorCode {
    /// Stable code string surfaced to API clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityErrorCode::UserNotFound => "auth/user-not-found",
            IdentityErrorCode::InvalidEmail => "auth/invalid-email",
            IdentityErrorCode::WeakPassword => "auth/weak-password",
            IdentityErrorCode::Provider => "auth/provider-error",
            IdentityErrorCode::Network => "auth/network-error",
        }
    }

    /// Message shown to API clients for this category.
    pub fn user_message(&self) -> &'static str {
        match self {
            IdentityErrorCode::UserNotFound => "User not found",
            IdentityErrorCode::InvalidEmail => "Invalid email format",
            IdentityErrorCode::WeakPassword => "Password is too weak",
            IdentityErrorCode::Provider | IdentityErrorCode::Network => "Reset password failed",
        }
    }
}

impl IdentityError {
    /// Create a new identity error.
    pub fn new(code: IdentityErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a user-not-found error.
    pub fn user_not_found(email: &str) -> Self {
        Self::new(
            IdentityErrorCode::UserNotFound,
            format!("No account for {}", email),
        )
    }
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for IdentityError {}
