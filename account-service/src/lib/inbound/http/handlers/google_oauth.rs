use axum::extract::Query;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use super::ApiError;
use crate::domain::account::models::OAuthLogin;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

/// 302 Found with a `Location` header.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirect the browser to the Google consent page.
pub async fn google_start<S: AccountServicePort>(
    State(state): State<AppState<S>>,
) -> Result<Response, ApiError> {
    let url = state
        .account_service
        .google_authorization_url()
        .await
        .map_err(ApiError::from)?;

    Ok(found(&url))
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Complete Google sign-in and hand the session to the frontend.
pub async fn google_callback<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Response, ApiError> {
    if let Some(error) = query.error {
        tracing::info!(error = %error, "Google sign-in was not completed");
        return Ok(found(&format!("{}/login?error=oauth_failed", state.frontend_url)));
    }

    let (Some(code), Some(oauth_state)) = (query.code, query.state) else {
        return Err(ApiError::BadRequest(
            "Missing authorization code or state".to_string(),
        ));
    };

    let login = state
        .account_service
        .complete_google_login(&code, &oauth_state)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        account_id = %login.session.account.id,
        new_signup = login.is_new_signup,
        "Google sign-in completed"
    );
    Ok(found(&success_redirect(&state.frontend_url, &login)))
}

/// Frontend landing URL carrying the session tokens.
pub fn success_redirect(frontend_url: &str, login: &OAuthLogin) -> String {
    let redirect_to = if login.is_new_signup {
        "onboarding"
    } else {
        "dashboard"
    };

    format!(
        "{}/social-login-success?token={}&refresh={}&new_signup={}&redirect_to={}",
        frontend_url,
        urlencoding::encode(&login.session.access_token),
        urlencoding::encode(&login.session.refresh_token),
        login.is_new_signup,
        redirect_to
    )
}
