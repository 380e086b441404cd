use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::models::Account;

/// Envelope for all outgoing account notifications.
#[derive(Debug, Clone)]
pub enum AccountNotification {
    Welcome(WelcomeNotification),
    EmailVerification(EmailVerificationNotification),
    PasswordReset(PasswordResetNotification),
}

impl AccountNotification {
    /// Extract the unique notification identifier.
    pub fn notification_id(&self) -> &str {
        match self {
            AccountNotification::Welcome(n) => &n.notification_id,
            AccountNotification::EmailVerification(n) => &n.notification_id,
            AccountNotification::PasswordReset(n) => &n.notification_id,
        }
    }

    /// Get the notification type name.
    ///
    /// # Returns
    /// Type string ("welcome", "email_verification", or "password_reset")
    pub fn kind(&self) -> &str {
        match self {
            AccountNotification::Welcome(_) => "welcome",
            AccountNotification::EmailVerification(_) => "email_verification",
            AccountNotification::PasswordReset(_) => "password_reset",
        }
    }

    /// Address the notification is sent to.
    pub fn recipient(&self) -> &str {
        match self {
            AccountNotification::Welcome(n) => &n.recipient,
            AccountNotification::EmailVerification(n) => &n.recipient,
            AccountNotification::PasswordReset(n) => &n.recipient,
        }
    }
}

/// Sent once an account has been created.
#[derive(Debug, Clone)]
pub struct WelcomeNotification {
    pub notification_id: String,
    pub account_id: String,
    pub recipient: String,
    pub first_name: String,
    pub created_at: DateTime<Utc>,
}

impl WelcomeNotification {
    pub fn new(account: &Account) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            account_id: account.id.to_string(),
            recipient: account.email.as_str().to_string(),
            first_name: account.first_name.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Carries a single-use email verification token to the account owner.
#[derive(Debug, Clone)]
pub struct EmailVerificationNotification {
    pub notification_id: String,
    pub account_id: String,
    pub recipient: String,
    pub first_name: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl EmailVerificationNotification {
    /// Create a verification notification for the account's current email.
    ///
    /// # Arguments
    /// * `account` - Account whose email must be verified
    /// * `token` - Signed email verification token
    pub fn new(account: &Account, token: String) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            account_id: account.id.to_string(),
            recipient: account.email.as_str().to_string(),
            first_name: account.first_name.clone(),
            token,
            created_at: Utc::now(),
        }
    }
}

/// Carries a password reset token to the account owner.
#[derive(Debug, Clone)]
pub struct PasswordResetNotification {
    pub notification_id: String,
    pub account_id: String,
    pub recipient: String,
    pub first_name: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetNotification {
    pub fn new(account: &Account, token: String) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            account_id: account.id.to_string(),
            recipient: account.email.as_str().to_string(),
            first_name: account.first_name.clone(),
            token,
            created_at: Utc::now(),
        }
    }
}
