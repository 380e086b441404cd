use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::ExternalProfile;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::OAuthLogin;
use crate::domain::account::models::RefreshedAccess;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::Session;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::notifications::AccountNotification;
use crate::account::errors::AccountError;
use crate::account::errors::IdentityProviderError;
use crate::account::errors::NotificationError;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new local account.
    ///
    /// Sends welcome and verification emails in the background.
    ///
    /// # Arguments
    /// * `command` - Validated registration payload
    ///
    /// # Returns
    /// Created account (unverified)
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError>;

    /// Authenticate with email and password and open a session.
    ///
    /// # Errors
    /// * `NoSuchAccount` - Email is not registered
    /// * `WrongAuthMethod` - Account has no local password
    /// * `InvalidCredentials` - Password does not match
    /// * `EmailNotVerified` - Email verification is required first
    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError>;

    /// Revoke the presented access token.
    async fn logout(&self, access_token: &str) -> Result<(), AccountError>;

    /// Mint a new access token from a refresh token.
    ///
    /// # Errors
    /// * `InvalidSessionToken` - Refresh token is expired, invalid, revoked or
    ///   issued before the last password reset
    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedAccess, AccountError>;

    /// Mark the account owning the token's email as verified.
    ///
    /// # Errors
    /// * `InvalidActionToken` - Token is expired, malformed or not a verification token
    /// * `AlreadyVerified` - Email was verified before
    async fn verify_email(&self, token: &str) -> Result<Account, AccountError>;

    /// Send a password reset email if a local account exists.
    ///
    /// Succeeds whether or not the email is registered.
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError>;

    /// Replace the password using a reset token.
    ///
    /// # Errors
    /// * `InvalidActionToken` - Token is expired, invalid or already used
    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AccountError>;

    /// Build the provider consent URL carrying a signed state value.
    async fn google_authorization_url(&self) -> Result<String, AccountError>;

    /// Complete Google sign-in: verify state, exchange code, resolve the account.
    ///
    /// # Arguments
    /// * `code` - Authorization code returned by the provider
    /// * `state` - State value issued by `google_authorization_url`
    ///
    /// # Errors
    /// * `InvalidActionToken` - State is missing, expired or forged
    /// * `IdentityProvider` - Code exchange or profile fetch failed
    async fn complete_google_login(
        &self,
        code: &str,
        state: &str,
    ) -> Result<OAuthLogin, AccountError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn get_profile(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Update profile fields.
    ///
    /// Changing the email clears verification and sends a new verification email.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<Account, AccountError>;

    /// Delete the account and revoke the access token that authorized the call.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn delete_account(&self, id: &AccountId, access_token: &str)
        -> Result<(), AccountError>;
}

/// Persistence operations for the account aggregate.
///
/// Implementations must enforce uniqueness of `email` and `google_id` and report
/// violations as `EmailAlreadyExists` / `GoogleIdAlreadyLinked`.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist new account to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `GoogleIdAlreadyLinked` - Google id belongs to another account
    /// * `ServiceUnavailable` - Storage did not answer in time
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Retrieve account by identifier.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by canonical email.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by linked Google id.
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<Account>, AccountError>;

    /// Update existing account in storage.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `GoogleIdAlreadyLinked` - Google id belongs to another account
    async fn update(&self, account: Account) -> Result<Account, AccountError>;

    /// Stamp a successful sign-in, writing only `last_login_at` and `updated_at`.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn record_login(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), AccountError>;

    /// Attach a Google id to an account that has none, marking the email
    /// verified and clearing any pending verification token. Other columns
    /// keep their stored values; the returned account reflects the stored row.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `GoogleIdAlreadyLinked` - Account already carries a Google id, or the
    ///   id belongs to another account
    async fn link_google(
        &self,
        id: &AccountId,
        google_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Account, AccountError>;

    /// Remove account from storage.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    async fn delete(&self, id: &AccountId) -> Result<(), AccountError>;
}

/// Delivery of account notifications (email).
#[async_trait]
pub trait AccountNotifier: Send + Sync + 'static {
    /// Deliver one notification.
    ///
    /// # Errors
    /// * `BuildFailed` - Message could not be rendered or addressed
    /// * `SendFailed` - Transport rejected the message
    async fn deliver(&self, notification: &AccountNotification) -> Result<(), NotificationError>;
}

/// External identity provider (Google OAuth 2.0).
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Consent page URL for the given signed state value.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user's profile.
    ///
    /// # Errors
    /// * `ExchangeFailed` - Code was rejected
    /// * `ProfileUnavailable` - Profile could not be fetched or parsed
    /// * `MissingEmail` - Provider returned no verified email
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, IdentityProviderError>;
}
