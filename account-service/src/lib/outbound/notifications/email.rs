use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::message::Message;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Tokio1Executor;

use crate::config::AuthConfig;
use crate::config::EmailConfig;
use crate::domain::account::notifications::AccountNotification;
use crate::account::errors::NotificationError;
use crate::account::ports::AccountNotifier;

const PRODUCT_NAME: &str = "QB Securiegnty";

/// Subject and plain-text body of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// SMTP notifier.
///
/// Without an SMTP URL the notifier logs each message and reports success,
/// which keeps local development usable.
pub struct EmailNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    frontend_url: String,
    api_base_url: String,
}

impl EmailNotifier {
    /// Create a notifier from configuration.
    ///
    /// # Errors
    /// * `BuildFailed` - SMTP URL or sender address is invalid
    pub fn new(email: &EmailConfig, auth: &AuthConfig) -> Result<Self, NotificationError> {
        let from = email
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::BuildFailed(format!("Invalid from address: {}", e)))?;

        let transport = match email.smtp_url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(
                AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
                    .map_err(|e| {
                        NotificationError::BuildFailed(format!("SMTP setup failed: {}", e))
                    })?
                    .build(),
            ),
            None => {
                tracing::warn!("SMTP not configured, account emails will be logged and skipped");
                None
            }
        };

        Ok(Self {
            transport,
            from,
            frontend_url: auth.frontend_url.trim_end_matches('/').to_string(),
            api_base_url: auth.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Render the message for a notification.
    pub fn render(&self, notification: &AccountNotification) -> RenderedEmail {
        match notification {
            AccountNotification::Welcome(n) => RenderedEmail {
                subject: format!("Welcome to {}", PRODUCT_NAME),
                body: format!(
                    "Hello {},\n\n\
                     Welcome to {}! Your account has been created.\n\n\
                     You can sign in at any time:\n\n{}/login\n\n\
                     Best regards,\n{}\n",
                    n.first_name, PRODUCT_NAME, self.frontend_url, PRODUCT_NAME
                ),
            },
            AccountNotification::EmailVerification(n) => RenderedEmail {
                subject: "Verify your email address".to_string(),
                body: format!(
                    "Hello {},\n\n\
                     Please verify your email address by opening the link below:\n\n\
                     {}/auth/verify-email?token={}\n\n\
                     This link will expire in 24 hours.\n\n\
                     If you did not create this account, please ignore this email.\n\n\
                     Best regards,\n{}\n",
                    n.first_name,
                    self.api_base_url,
                    urlencoding::encode(&n.token),
                    PRODUCT_NAME
                ),
            },
            AccountNotification::PasswordReset(n) => RenderedEmail {
                subject: "Reset your password".to_string(),
                body: format!(
                    "Hello {},\n\n\
                     We received a request to reset the password for your account.\n\n\
                     To choose a new password, open the link below:\n\n\
                     {}/reset-password?token={}\n\n\
                     This link can only be used once. If you did not request a password \
                     reset, please ignore this email; your password will remain unchanged.\n\n\
                     Best regards,\n{}\n",
                    n.first_name,
                    self.frontend_url,
                    urlencoding::encode(&n.token),
                    PRODUCT_NAME
                ),
            },
        }
    }
}

#[async_trait]
impl AccountNotifier for EmailNotifier {
    async fn deliver(&self, notification: &AccountNotification) -> Result<(), NotificationError> {
        let Some(transport) = &self.transport else {
            tracing::info!(
                notification_id = notification.notification_id(),
                kind = notification.kind(),
                "Email transport not configured, skipping notification"
            );
            return Ok(());
        };

        let rendered = self.render(notification);
        let to = notification
            .recipient()
            .parse::<Mailbox>()
            .map_err(|e| NotificationError::BuildFailed(format!("Invalid to address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(rendered.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(rendered.body)
            .map_err(|e| NotificationError::BuildFailed(format!("Failed to build email: {}", e)))?;

        transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        tracing::info!(
            notification_id = notification.notification_id(),
            kind = notification.kind(),
            "Email sent"
        );
        Ok(())
    }
}
