use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn logout<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .account_service
        .logout(&caller.token)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(account_id = %caller.account_id, "Logged out");
    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Logged out successfully"),
    ))
}
