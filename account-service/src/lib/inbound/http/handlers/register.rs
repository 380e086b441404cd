use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::RegistrationInput;
use crate::inbound::http::router::AppState;

pub async fn register<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<RegistrationInput>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let command = state.validation.registration(input)?;

    state
        .account_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref account| {
            ApiSuccess::new(
                StatusCode::CREATED,
                RegisterResponseData {
                    message: "Registration successful. Please check your email to verify your account."
                        .to_string(),
                    account: account.into(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub message: String,
    pub account: AccountData,
}
