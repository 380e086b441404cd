use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::MessageData;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::ResetPasswordInput;
use crate::inbound::http::router::AppState;

pub async fn reset_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<ResetPasswordInput>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let command = state.validation.reset_password(input)?;

    state
        .account_service
        .reset_password(command)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData::new("Password has been reset. You can now sign in."),
            )
        })
}
