use auth::TokenError;
use thiserror::Error;

use crate::account::validation::ValidationErrors;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for notification delivery
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    #[error("Failed to send message: {0}")]
    SendFailed(String),
}

/// Error for external identity provider calls
#[derive(Debug, Clone, Error)]
pub enum IdentityProviderError {
    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Failed to fetch user profile: {0}")]
    ProfileUnavailable(String),

    #[error("Identity provider did not return a verified email")]
    MissingEmail,
}

/// Top-level error for all account-related operations
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid account ID: {0}")]
    InvalidAccountId(#[from] AccountIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    // Domain-level errors
    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Google account is already linked to another account")]
    GoogleIdAlreadyLinked,

    /// No account for the supplied email; surfaced to clients as `InvalidCredentials`
    #[error("No account for supplied email")]
    NoSuchAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account has no usable local password (registered through Google)
    #[error("Account uses a different sign-in method")]
    WrongAuthMethod,

    #[error("Email address has not been verified")]
    EmailNotVerified,

    #[error("Email address is already verified")]
    AlreadyVerified,

    /// Access or refresh token rejected
    #[error("Invalid session token: {0}")]
    InvalidSessionToken(TokenError),

    /// Verification, reset or OAuth state token rejected
    #[error("Invalid or expired token: {0}")]
    InvalidActionToken(TokenError),

    #[error("Failed to issue token: {0}")]
    TokenIssuance(TokenError),

    #[error("Identity provider error: {0}")]
    IdentityProvider(#[from] IdentityProviderError),

    #[error("Password error: {0}")]
    Password(String),

    // Infrastructure errors
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<auth::PasswordError> for AccountError {
    fn from(err: auth::PasswordError) -> Self {
        AccountError::Password(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Unknown(err.to_string())
    }
}
