use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::account::models::Session;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::LoginInput;
use crate::inbound::http::router::AppState;

pub async fn login<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let command = state.validation.login(input)?;

    state
        .account_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub account: AccountData,
}

impl From<&Session> for LoginResponseData {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: session.expires_in,
            account: (&session.account).into(),
        }
    }
}
