use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenKind;
use crate::revocation::RevocationList;

/// Minimum accepted length of the signing secret, in bytes (HS256 key size).
pub const MIN_SECRET_LENGTH: usize = 32;

/// How long each kind of token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub email_verification: Duration,
    pub password_reset: Duration,
    pub oauth_state: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
            email_verification: Duration::hours(24),
            password_reset: Duration::hours(1),
            oauth_state: Duration::minutes(10),
        }
    }
}

/// Token issuance and verification errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token signing secret too short: minimum {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Wrong token purpose: expected {expected}, got {found}")]
    WrongPurpose {
        expected: TokenKind,
        found: TokenKind,
    },

    #[error("Missing required claim: {0}")]
    MissingClaim(&'static str),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => TokenError::Expired,
            JwtError::InvalidSignature | JwtError::Malformed(_) => TokenError::Malformed,
            JwtError::EncodingFailed(msg) => TokenError::Signing(msg),
        }
    }
}

/// Issues, verifies and revokes the signed tokens used by the service.
///
/// Stateless apart from the revocation list.
pub struct TokenService {
    jwt_handler: JwtHandler,
    lifetimes: TokenLifetimes,
    revocations: Arc<dyn RevocationList>,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `secret` - HS256 signing secret, at least 32 bytes
    /// * `lifetimes` - Expiry per token kind
    /// * `revocations` - Revocation list consulted on every verification
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    /// * `WeakSecret` - Secret is shorter than `MIN_SECRET_LENGTH`
    pub fn new(
        secret: &[u8],
        lifetimes: TokenLifetimes,
        revocations: Arc<dyn RevocationList>,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            jwt_handler: JwtHandler::new(secret),
            lifetimes,
            revocations,
        })
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    /// Issue a short-lived access token.
    pub fn issue_access_token(&self, account_id: &str, email: &str) -> Result<String, TokenError> {
        let claims = Claims::new(TokenKind::Access, self.lifetimes.access)
            .with_subject(account_id)
            .with_email(email);
        Ok(self.jwt_handler.encode(&claims)?)
    }

    /// Issue a refresh token bound to the account's current token version.
    pub fn issue_refresh_token(&self, account_id: &str, version: i32) -> Result<String, TokenError> {
        let claims = Claims::new(TokenKind::Refresh, self.lifetimes.refresh)
            .with_subject(account_id)
            .with_version(version);
        Ok(self.jwt_handler.encode(&claims)?)
    }

    /// Verify a token and check that it was issued for `expected`.
    ///
    /// # Errors
    /// * `Expired` - Token is past its expiry
    /// * `Malformed` - Token is not a valid JWT or the signature does not verify
    /// * `WrongPurpose` - Token was issued for another purpose
    /// * `Revoked` - Token is on the revocation list
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.kind != expected {
            return Err(TokenError::WrongPurpose {
                expected,
                found: claims.kind,
            });
        }

        if self.revocations.is_revoked(&claims.jti) {
            return Err(TokenError::Revoked);
        }

        Ok(claims)
    }

    /// Verify an access token; the returned claims always carry a subject.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token, TokenKind::Access)?;
        if claims.sub.is_none() {
            return Err(TokenError::MissingClaim("sub"));
        }
        Ok(claims)
    }

    /// Verify a refresh token; the returned claims carry a subject and version.
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token, TokenKind::Refresh)?;
        if claims.sub.is_none() {
            return Err(TokenError::MissingClaim("sub"));
        }
        if claims.ver.is_none() {
            return Err(TokenError::MissingClaim("ver"));
        }
        Ok(claims)
    }

    /// Revoke a token before its natural expiry.
    ///
    /// Idempotent. An already expired token needs no entry and is accepted.
    ///
    /// # Errors
    /// * `Malformed` - Token is not a token this service signed
    pub fn revoke(&self, token: &str) -> Result<(), TokenError> {
        let claims: Claims = match self.jwt_handler.decode(token) {
            Ok(claims) => claims,
            Err(JwtError::TokenExpired) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        self.revocations.revoke(&claims.jti, claims.exp);
        tracing::debug!(
            token_id = %claims.jti,
            token_type = %claims.kind,
            "Token revoked"
        );
        Ok(())
    }

    /// Issue an email verification token for `email`.
    pub fn issue_email_verification_token(&self, email: &str) -> Result<String, TokenError> {
        let claims = Claims::new(
            TokenKind::EmailVerification,
            self.lifetimes.email_verification,
        )
        .with_email(email);
        Ok(self.jwt_handler.encode(&claims)?)
    }

    /// Verify an email verification token.
    ///
    /// # Returns
    /// The email address the token was issued for
    pub fn verify_email_verification_token(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token, TokenKind::EmailVerification)?
            .email
            .ok_or(TokenError::MissingClaim("email"))
    }

    /// Issue a password reset token bound to the account's current token version.
    pub fn issue_password_reset_token(
        &self,
        account_id: &str,
        version: i32,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(TokenKind::PasswordReset, self.lifetimes.password_reset)
            .with_subject(account_id)
            .with_version(version);
        Ok(self.jwt_handler.encode(&claims)?)
    }

    /// Verify a password reset token; the returned claims carry a subject and version.
    pub fn verify_password_reset_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token, TokenKind::PasswordReset)?;
        if claims.sub.is_none() {
            return Err(TokenError::MissingClaim("sub"));
        }
        if claims.ver.is_none() {
            return Err(TokenError::MissingClaim("ver"));
        }
        Ok(claims)
    }

    /// Issue an opaque signed `state` value for an OAuth round trip.
    pub fn issue_oauth_state(&self) -> Result<String, TokenError> {
        let claims = Claims::new(TokenKind::OauthState, self.lifetimes.oauth_state);
        Ok(self.jwt_handler.encode(&claims)?)
    }

    /// Verify an OAuth `state` and revoke it in the same step.
    ///
    /// Of several concurrent calls with the same state, only one succeeds.
    ///
    /// # Errors
    /// * `Expired`, `Malformed`, `WrongPurpose` - State fails verification
    /// * `Revoked` - State was already consumed
    pub fn consume_oauth_state(&self, state: &str) -> Result<(), TokenError> {
        let claims = self.verify(state, TokenKind::OauthState)?;
        if !self.revocations.revoke(&claims.jti, claims.exp) {
            return Err(TokenError::Revoked);
        }
        Ok(())
    }
}
