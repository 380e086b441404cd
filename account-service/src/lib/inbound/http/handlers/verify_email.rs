use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    token: Option<String>,
}

pub async fn verify_email<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<ApiSuccess<VerifyEmailResponseData>, ApiError> {
    let token = query
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Verification token is required".to_string()))?;

    state
        .account_service
        .verify_email(token.trim())
        .await
        .map_err(ApiError::from)
        .map(|ref account| {
            ApiSuccess::new(
                StatusCode::OK,
                VerifyEmailResponseData {
                    message: "Email verified successfully".to_string(),
                    account: account.into(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEmailResponseData {
    pub message: String,
    pub account: AccountData,
}
