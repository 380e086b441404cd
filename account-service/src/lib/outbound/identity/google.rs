use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::ExternalProfile;
use crate::domain::account::validation::provider_name;
use crate::account::errors::IdentityProviderError;
use crate::account::ports::IdentityProvider;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const SCOPES: &str = "openid email profile";

/// Google OAuth 2.0 authorization-code client.
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    config: GoogleConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OpenID Connect userinfo payload
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    given_name: Option<String>,
    family_name: Option<String>,
    name: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleConfig) -> Result<Self, anyhow::Error> {
        if config.client_id.trim().is_empty() {
            tracing::warn!("Google client_id is empty, Google sign-in will fail");
        }

        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, IdentityProviderError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| IdentityProviderError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(IdentityProviderError::ExchangeFailed(format!(
                "token endpoint returned {}",
                status
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map(|token| token.access_token)
            .map_err(|e| {
                IdentityProviderError::ExchangeFailed(format!("invalid token response: {}", e))
            })
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, IdentityProviderError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityProviderError::ProfileUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(status = %status, "Google userinfo request failed");
            return Err(IdentityProviderError::ProfileUnavailable(format!(
                "userinfo endpoint returned {}",
                status
            )));
        }

        response.json::<UserInfo>().await.map_err(|e| {
            IdentityProviderError::ProfileUnavailable(format!("invalid userinfo response: {}", e))
        })
    }
}

/// Map a userinfo payload onto an external profile.
fn into_profile(info: UserInfo) -> Result<ExternalProfile, IdentityProviderError> {
    if info.email_verified == Some(false) {
        return Err(IdentityProviderError::MissingEmail);
    }
    let email = info
        .email
        .as_deref()
        .ok_or(IdentityProviderError::MissingEmail)
        .and_then(|raw| {
            EmailAddress::parse(raw).map_err(|_| IdentityProviderError::MissingEmail)
        })?;

    let display_first = info
        .name
        .as_deref()
        .and_then(|name| name.split_whitespace().next());
    let first_name = provider_name(info.given_name.as_deref().or(display_first), "User");
    let last_name = provider_name(info.family_name.as_deref(), "");

    Ok(ExternalProfile {
        provider_id: info.sub,
        email,
        first_name,
        last_name,
    })
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.callback_url),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, IdentityProviderError> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_user_info(&access_token).await?;
        tracing::debug!(provider_id = %info.sub, "Fetched Google profile");
        into_profile(info)
    }
}
