use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::MessageData;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::DeleteAccountInput;
use crate::domain::account::validation::ProfileUpdateInput;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn get_profile<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    state
        .account_service
        .get_profile(&caller.account_id)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

pub async fn update_profile<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    JsonBody(input): JsonBody<ProfileUpdateInput>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let command = state.validation.profile_update(input)?;

    state
        .account_service
        .update_profile(&caller.account_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

/// Delete the caller's account; requires an explicit confirmation phrase.
pub async fn delete_profile<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    JsonBody(input): JsonBody<DeleteAccountInput>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state.validation.delete_account(input)?;

    state
        .account_service
        .delete_account(&caller.account_id, &caller.token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Account deleted")))
}
