use std::fmt;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// What a token may be used for.
///
/// Serialized into the `token_type` claim. For single-purpose tokens
/// (email verification, password reset, OAuth state) this is the purpose marker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    EmailVerification,
    PasswordReset,
    OauthState,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::EmailVerification => "email_verification",
            TokenKind::PasswordReset => "password_reset",
            TokenKind::OauthState => "oauth_state",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims carried by every token the service issues.
///
/// `exp`, `iat` and `jti` are always present; the remaining claims depend on
/// the token kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (account identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Account email (access and email verification tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "token_type")]
    pub kind: TokenKind,

    /// Per-account token version (refresh and password reset tokens)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ver: Option<i32>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Unique token identifier, used as the revocation key
    pub jti: String,
}

impl Claims {
    /// Create claims of the given kind expiring `lifetime` from now.
    ///
    /// # Arguments
    /// * `kind` - Token kind
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with exp, iat and a fresh jti set
    pub fn new(kind: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + lifetime;

        Self {
            sub: None,
            email: None,
            kind,
            ver: None,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set email.
    pub fn with_email(mut self, email: impl ToString) -> Self {
        self.email = Some(email.to_string());
        self
    }

    /// Set token version.
    pub fn with_version(mut self, ver: i32) -> Self {
        self.ver = Some(ver);
        self
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
