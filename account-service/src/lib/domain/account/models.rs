use std::fmt;
use std::str::FromStr;

use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;

/// Account aggregate entity.
///
/// `password_hash` is `None` for accounts created through Google sign-in;
/// such accounts have no local password until one is set by a reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_email_verified: bool,
    pub verification_token: Option<String>,
    /// Bumped on password reset to invalidate outstanding reset and refresh tokens
    pub token_version: i32,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build a new account registered with email and password.
    pub fn new_local(
        email: EmailAddress,
        password_hash: String,
        first_name: String,
        last_name: String,
        country: Option<String>,
        verification_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            email,
            password_hash: Some(password_hash),
            google_id: None,
            is_email_verified: false,
            verification_token: Some(verification_token),
            token_version: 0,
            first_name,
            last_name,
            country,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new account from an external identity profile.
    ///
    /// The provider has verified the email; there is no local password.
    pub fn new_external(profile: &ExternalProfile) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            email: profile.email.clone(),
            password_hash: None,
            google_id: Some(profile.provider_id.clone()),
            is_email_verified: true,
            verification_token: None,
            token_version: 0,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            country: None,
            last_login_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the stored credential is a usable password hash.
    pub fn has_usable_password(&self) -> bool {
        self.password_hash
            .as_deref()
            .map(PasswordHasher::is_hash)
            .unwrap_or(false)
    }

    /// Record a successful sign-in.
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = Some(at);
        self.updated_at = at;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Always held in canonical form: trimmed and lower-cased, so equality is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize and validate an email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let normalized = Self::normalize(raw);
        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Canonical form of a raw address: trimmed and lower-cased.
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domain part of the address.
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("")
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password supplied by a client.
///
/// Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Command to register a new local account
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
}

/// Command to sign in with email and password
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: Password,
}

/// Command to set a new password with a reset token
#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
    pub token: String,
    pub new_password: Password,
}

/// Command to update profile fields.
///
/// Only provided fields are updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileCommand {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<EmailAddress>,
    pub country: Option<String>,
}

/// Identity asserted by an external provider (Google).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Stable provider-side subject identifier
    pub provider_id: String,
    pub email: EmailAddress,
    pub first_name: String,
    pub last_name: String,
}

/// Outcome of mapping an external identity onto an account.
#[derive(Debug, Clone)]
pub struct ResolvedAccount {
    pub account: Account,
    /// True only when the account was created by this resolution
    pub is_new: bool,
}

/// Access and refresh tokens issued at sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub account: Account,
}

/// Session established through Google sign-in.
#[derive(Debug, Clone)]
pub struct OAuthLogin {
    pub session: Session,
    pub is_new_signup: bool,
}

/// New access token minted from a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedAccess {
    pub access_token: String,
    pub expires_in: i64,
}
