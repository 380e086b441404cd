use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::validation::RefreshInput;
use crate::inbound::http::router::AppState;

pub async fn refresh_token<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<RefreshInput>,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let refresh_token = state.validation.refresh(input)?;

    state
        .account_service
        .refresh_session(&refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|access| {
            ApiSuccess::new(
                StatusCode::OK,
                RefreshResponseData {
                    access_token: access.access_token,
                    token_type: "Bearer".to_string(),
                    expires_in: access.expires_in,
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
