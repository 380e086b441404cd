use std::sync::Arc;

use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::models::ExternalProfile;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::Password;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::ResolvedAccount;
use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;

/// Maps an authentication attempt onto exactly one account record.
///
/// Owns password hashing. Hashes are computed on the blocking pool so request
/// workers are never stalled by Argon2.
pub struct AccountResolver<R>
where
    R: AccountRepository,
{
    repository: Arc<R>,
    password_hasher: PasswordHasher,
    /// Verified against for unknown emails so both login failures cost the same
    dummy_hash: String,
    require_verified_email: bool,
}

impl<R> AccountResolver<R>
where
    R: AccountRepository,
{
    /// Create a resolver.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `password_hasher` - Hasher used for new passwords and the timing dummy
    /// * `require_verified_email` - Reject local login until the email is verified
    ///
    /// # Errors
    /// * `Password` - Dummy hash could not be computed
    pub fn new(
        repository: Arc<R>,
        password_hasher: PasswordHasher,
        require_verified_email: bool,
    ) -> Result<Self, AccountError> {
        let dummy_hash = password_hasher.hash("account-resolver-timing-placeholder")?;
        Ok(Self {
            repository,
            password_hasher,
            dummy_hash,
            require_verified_email,
        })
    }

    /// Hash a plaintext password off the async workers.
    pub async fn hash_password(&self, password: &Password) -> Result<String, AccountError> {
        let hasher = self.password_hasher.clone();
        let password = password.expose().to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(AccountError::from)
    }

    async fn verify_password(&self, password: &Password, hash: String) -> Result<bool, AccountError> {
        let hasher = self.password_hasher.clone();
        let password = password.expose().to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AccountError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(AccountError::from)
    }

    /// Resolve a local login to its account and record the sign-in.
    ///
    /// # Errors
    /// * `NoSuchAccount` - Email is not registered
    /// * `WrongAuthMethod` - Stored credential is not a usable password hash
    /// * `InvalidCredentials` - Password does not match
    /// * `EmailNotVerified` - Verification is required and has not happened
    pub async fn authenticate(&self, command: &LoginCommand) -> Result<Account, AccountError> {
        let Some(mut account) = self.repository.find_by_email(&command.email).await? else {
            let _ = self
                .verify_password(&command.password, self.dummy_hash.clone())
                .await;
            tracing::info!(email = %command.email, "Login attempt for unknown email");
            return Err(AccountError::NoSuchAccount);
        };

        let stored_hash = match account.password_hash.as_deref() {
            Some(hash) if PasswordHasher::is_hash(hash) => hash.to_string(),
            _ => {
                tracing::info!(account_id = %account.id, "Password login attempted on account without local password");
                return Err(AccountError::WrongAuthMethod);
            }
        };

        if !self.verify_password(&command.password, stored_hash).await? {
            tracing::warn!(account_id = %account.id, "Login failed: password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        if self.require_verified_email && !account.is_email_verified {
            tracing::info!(account_id = %account.id, "Login refused: email not verified");
            return Err(AccountError::EmailNotVerified);
        }

        self.record_login(&mut account).await?;
        Ok(account)
    }

    /// Stamp the sign-in in storage, leaving every other column as stored.
    async fn record_login(&self, account: &mut Account) -> Result<(), AccountError> {
        let now = Utc::now();
        self.repository.record_login(&account.id, now).await?;
        account.record_login(now);
        Ok(())
    }

    /// Create a local account.
    ///
    /// The existence check only produces an early error; the store's unique
    /// constraint decides concurrent registrations.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    pub async fn register(
        &self,
        command: RegisterCommand,
        verification_token: String,
    ) -> Result<Account, AccountError> {
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(AccountError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(&command.password).await?;
        let account = Account::new_local(
            command.email,
            password_hash,
            command.first_name,
            command.last_name,
            command.country,
            verification_token,
        );

        self.repository.create(account).await
    }

    /// Resolve a Google identity, in priority order:
    /// 1. account already linked to the Google id (reuse)
    /// 2. account with the same email (link and mark verified)
    /// 3. no match (create, verified, without local password)
    ///
    /// A create that loses a race against a concurrent resolution of the same
    /// identity is retried once through paths 1 and 2.
    pub async fn resolve_external(
        &self,
        profile: &ExternalProfile,
    ) -> Result<ResolvedAccount, AccountError> {
        if let Some(resolved) = self.find_external(profile).await? {
            return Ok(resolved);
        }

        match self
            .repository
            .create(Account::new_external(profile))
            .await
        {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "Created account from Google sign-in");
                Ok(ResolvedAccount {
                    account,
                    is_new: true,
                })
            }
            Err(e @ (AccountError::EmailAlreadyExists(_) | AccountError::GoogleIdAlreadyLinked)) => {
                tracing::info!(
                    email = %profile.email,
                    "Concurrent Google account creation detected, retrying resolution"
                );
                self.find_external(profile).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn find_external(
        &self,
        profile: &ExternalProfile,
    ) -> Result<Option<ResolvedAccount>, AccountError> {
        if let Some(account) = self
            .repository
            .find_by_google_id(&profile.provider_id)
            .await?
        {
            return self.reuse_linked(account).await.map(Some);
        }

        let Some(account) = self.repository.find_by_email(&profile.email).await? else {
            return Ok(None);
        };

        if account.google_id.is_some() {
            tracing::warn!(
                account_id = %account.id,
                "Email already linked to a different Google identity"
            );
            return Err(AccountError::GoogleIdAlreadyLinked);
        }

        match self
            .repository
            .link_google(&account.id, &profile.provider_id, Utc::now())
            .await
        {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "Linked Google identity to existing account");
                Ok(Some(ResolvedAccount {
                    account,
                    is_new: false,
                }))
            }
            // A concurrent sign-in may have linked this identity first
            Err(AccountError::GoogleIdAlreadyLinked) => {
                match self
                    .repository
                    .find_by_google_id(&profile.provider_id)
                    .await?
                {
                    Some(linked) => self.reuse_linked(linked).await.map(Some),
                    None => {
                        tracing::warn!(
                            account_id = %account.id,
                            "Account was linked to a different Google identity concurrently"
                        );
                        Err(AccountError::GoogleIdAlreadyLinked)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn reuse_linked(&self, mut account: Account) -> Result<ResolvedAccount, AccountError> {
        self.record_login(&mut account).await?;
        tracing::info!(account_id = %account.id, "Google sign-in for linked account");
        Ok(ResolvedAccount {
            account,
            is_new: false,
        })
    }
}
