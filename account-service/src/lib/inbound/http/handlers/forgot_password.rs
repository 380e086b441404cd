use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::MessageData;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::ForgotPasswordInput;
use crate::inbound::http::router::AppState;

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for this email, a password reset link has been sent.";

/// Always answers with the same acknowledgement, whether or not the email
/// is registered.
pub async fn forgot_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<ForgotPasswordInput>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email = state.validation.forgot_password(input)?;

    if let Err(e) = state.account_service.request_password_reset(&email).await {
        tracing::error!(error = %e, "Password reset request failed");
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new(FORGOT_PASSWORD_MESSAGE),
    ))
}
