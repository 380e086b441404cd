use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenError;
use auth::TokenService;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::OAuthLogin;
use crate::domain::account::models::RefreshedAccess;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::Session;
use crate::domain::account::models::UpdateProfileCommand;
use crate::domain::account::notifications::AccountNotification;
use crate::domain::account::notifications::EmailVerificationNotification;
use crate::domain::account::notifications::PasswordResetNotification;
use crate::domain::account::notifications::WelcomeNotification;
use crate::domain::account::resolver::AccountResolver;
use crate::account::errors::AccountError;
use crate::account::ports::AccountNotifier;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::account::ports::IdentityProvider;

/// Domain service implementation for account operations.
///
/// Composes the resolver, the token service and the outbound ports into the
/// operations exposed over HTTP.
pub struct AccountService<R, N, P>
where
    R: AccountRepository,
    N: AccountNotifier,
    P: IdentityProvider,
{
    repository: Arc<R>,
    resolver: AccountResolver<R>,
    notifier: Arc<N>,
    identity_provider: Arc<P>,
    tokens: Arc<TokenService>,
}

impl<R, N, P> AccountService<R, N, P>
where
    R: AccountRepository,
    N: AccountNotifier,
    P: IdentityProvider,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `notifier` - Email delivery implementation
    /// * `identity_provider` - Google OAuth client
    /// * `tokens` - Token issuing and verification
    /// * `password_hasher` - Argon2 hasher with deployment cost parameters
    /// * `require_verified_email` - Reject local login for unverified emails
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        identity_provider: Arc<P>,
        tokens: Arc<TokenService>,
        password_hasher: PasswordHasher,
        require_verified_email: bool,
    ) -> Result<Self, AccountError> {
        let resolver =
            AccountResolver::new(Arc::clone(&repository), password_hasher, require_verified_email)?;
        Ok(Self {
            repository,
            resolver,
            notifier,
            identity_provider,
            tokens,
        })
    }

    /// Hand a notification to the notifier without waiting for delivery.
    ///
    /// Failures are logged and never reach the caller.
    fn dispatch(&self, notification: AccountNotification) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&notification).await {
                tracing::error!(
                    notification_id = notification.notification_id(),
                    kind = notification.kind(),
                    error = %e,
                    "Failed to deliver account notification"
                );
            }
        });
    }

    fn open_session(&self, account: Account) -> Result<Session, AccountError> {
        let account_id = account.id.to_string();
        let access_token = self
            .tokens
            .issue_access_token(&account_id, account.email.as_str())
            .map_err(AccountError::TokenIssuance)?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(&account_id, account.token_version)
            .map_err(AccountError::TokenIssuance)?;

        Ok(Session {
            access_token,
            refresh_token,
            expires_in: self.tokens.lifetimes().access.num_seconds(),
            account,
        })
    }

    async fn find_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<R, N, P> AccountServicePort for AccountService<R, N, P>
where
    R: AccountRepository,
    N: AccountNotifier,
    P: IdentityProvider,
{
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError> {
        let verification_token = self
            .tokens
            .issue_email_verification_token(command.email.as_str())
            .map_err(AccountError::TokenIssuance)?;

        let account = self
            .resolver
            .register(command, verification_token.clone())
            .await?;
        tracing::info!(account_id = %account.id, "Account registered");

        self.dispatch(AccountNotification::Welcome(WelcomeNotification::new(
            &account,
        )));
        self.dispatch(AccountNotification::EmailVerification(
            EmailVerificationNotification::new(&account, verification_token),
        ));

        Ok(account)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, AccountError> {
        let account = self.resolver.authenticate(&command).await?;
        tracing::info!(account_id = %account.id, "Login succeeded");
        self.open_session(account)
    }

    async fn logout(&self, access_token: &str) -> Result<(), AccountError> {
        self.tokens
            .revoke(access_token)
            .map_err(AccountError::InvalidSessionToken)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshedAccess, AccountError> {
        let claims = self
            .tokens
            .verify_refresh_token(refresh_token)
            .map_err(AccountError::InvalidSessionToken)?;

        let account_id = claims
            .sub
            .as_deref()
            .map(AccountId::from_string)
            .transpose()
            .map_err(|_| AccountError::InvalidSessionToken(TokenError::Malformed))?
            .ok_or(AccountError::InvalidSessionToken(TokenError::MissingClaim("sub")))?;

        let account = self
            .repository
            .find_by_id(&account_id)
            .await?
            .ok_or(AccountError::InvalidSessionToken(TokenError::Revoked))?;

        if claims.ver != Some(account.token_version) {
            tracing::info!(account_id = %account.id, "Refresh token predates password reset");
            return Err(AccountError::InvalidSessionToken(TokenError::Revoked));
        }

        let access_token = self
            .tokens
            .issue_access_token(&account.id.to_string(), account.email.as_str())
            .map_err(AccountError::TokenIssuance)?;

        Ok(RefreshedAccess {
            access_token,
            expires_in: self.tokens.lifetimes().access.num_seconds(),
        })
    }

    async fn verify_email(&self, token: &str) -> Result<Account, AccountError> {
        let email = self
            .tokens
            .verify_email_verification_token(token)
            .map_err(AccountError::InvalidActionToken)?;
        let email = EmailAddress::parse(&email)
            .map_err(|_| AccountError::InvalidActionToken(TokenError::Malformed))?;

        let mut account = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidActionToken(TokenError::Malformed))?;

        if account.is_email_verified {
            return Err(AccountError::AlreadyVerified);
        }

        account.is_email_verified = true;
        account.verification_token = None;
        account.touch();

        let account = self.repository.update(account).await?;
        tracing::info!(account_id = %account.id, "Email verified");
        Ok(account)
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), AccountError> {
        let account = match self.repository.find_by_email(email).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::info!(email = %email, "Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(error = %e, "Password reset lookup failed");
                return Ok(());
            }
        };

        if !account.has_usable_password() {
            tracing::info!(account_id = %account.id, "Password reset requested for Google-only account");
            return Ok(());
        }

        match self
            .tokens
            .issue_password_reset_token(&account.id.to_string(), account.token_version)
        {
            Ok(token) => {
                self.dispatch(AccountNotification::PasswordReset(
                    PasswordResetNotification::new(&account, token),
                ));
                tracing::info!(account_id = %account.id, "Password reset email queued");
            }
            Err(e) => {
                tracing::error!(account_id = %account.id, error = %e, "Failed to issue password reset token");
            }
        }

        Ok(())
    }

    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AccountError> {
        let claims = self
            .tokens
            .verify_password_reset_token(&command.token)
            .map_err(AccountError::InvalidActionToken)?;

        let account_id = claims
            .sub
            .as_deref()
            .map(AccountId::from_string)
            .transpose()
            .map_err(|_| AccountError::InvalidActionToken(TokenError::Malformed))?
            .ok_or(AccountError::InvalidActionToken(TokenError::MissingClaim("sub")))?;

        let mut account = self
            .repository
            .find_by_id(&account_id)
            .await?
            .ok_or(AccountError::InvalidActionToken(TokenError::Malformed))?;

        if claims.ver != Some(account.token_version) {
            tracing::info!(account_id = %account.id, "Reset token already used or superseded");
            return Err(AccountError::InvalidActionToken(TokenError::Revoked));
        }

        account.password_hash = Some(self.resolver.hash_password(&command.new_password).await?);
        account.token_version += 1;
        account.touch();

        let account = self.repository.update(account).await?;
        if let Err(e) = self.tokens.revoke(&command.token) {
            tracing::debug!(error = %e, "Reset token could not be revoked");
        }

        tracing::info!(account_id = %account.id, "Password reset completed");
        Ok(())
    }

    async fn google_authorization_url(&self) -> Result<String, AccountError> {
        let state = self
            .tokens
            .issue_oauth_state()
            .map_err(AccountError::TokenIssuance)?;
        Ok(self.identity_provider.authorization_url(&state))
    }

    async fn complete_google_login(
        &self,
        code: &str,
        state: &str,
    ) -> Result<OAuthLogin, AccountError> {
        self.tokens
            .consume_oauth_state(state)
            .map_err(AccountError::InvalidActionToken)?;

        let profile = self.identity_provider.exchange_code(code).await?;
        let resolved = self.resolver.resolve_external(&profile).await?;

        if resolved.is_new {
            self.dispatch(AccountNotification::Welcome(WelcomeNotification::new(
                &resolved.account,
            )));
        }

        Ok(OAuthLogin {
            session: self.open_session(resolved.account)?,
            is_new_signup: resolved.is_new,
        })
    }

    async fn get_profile(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.find_account(id).await
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<Account, AccountError> {
        let mut account = self.find_account(id).await?;

        if let Some(first_name) = command.first_name {
            account.first_name = first_name;
        }

        if let Some(last_name) = command.last_name {
            account.last_name = last_name;
        }

        if let Some(country) = command.country {
            account.country = Some(country);
        }

        let mut verification = None;
        if let Some(email) = command.email.filter(|email| *email != account.email) {
            if self.repository.find_by_email(&email).await?.is_some() {
                return Err(AccountError::EmailAlreadyExists(email.to_string()));
            }

            let token = self
                .tokens
                .issue_email_verification_token(email.as_str())
                .map_err(AccountError::TokenIssuance)?;
            account.email = email;
            account.is_email_verified = false;
            account.verification_token = Some(token.clone());
            verification = Some(token);
        }

        account.touch();
        let account = self.repository.update(account).await?;

        if let Some(token) = verification {
            tracing::info!(account_id = %account.id, "Email changed, verification required");
            self.dispatch(AccountNotification::EmailVerification(
                EmailVerificationNotification::new(&account, token),
            ));
        }

        Ok(account)
    }

    async fn delete_account(
        &self,
        id: &AccountId,
        access_token: &str,
    ) -> Result<(), AccountError> {
        self.repository.delete(id).await?;

        if let Err(e) = self.tokens.revoke(access_token) {
            tracing::warn!(account_id = %id, error = %e, "Failed to revoke token of deleted account");
        }

        tracing::info!(account_id = %id, "Account deleted");
        Ok(())
    }
}
