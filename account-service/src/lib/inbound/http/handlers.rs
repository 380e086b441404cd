use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::validation::FieldError;
use crate::domain::account::validation::ValidationErrors;

pub mod forgot_password;
pub mod google_oauth;
pub mod login;
pub mod logout;
pub mod profile;
pub mod refresh_token;
pub mod register;
pub mod reset_password;
pub mod verify_email;

const INVALID_LOGIN: &str = "Invalid email or password";
const INVALID_TOKEN: &str = "Invalid or expired token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// JSON body extractor whose rejections use the API error format.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Validation(ValidationErrors),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    ServiceUnavailable(String),
}

impl ApiError {
    /// Log an unexpected failure under a fresh correlation id.
    ///
    /// Internal detail is exposed to clients only in debug builds.
    fn internal(detail: String) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        tracing::error!(correlation_id = %correlation_id, error = %detail, "Unexpected failure");

        if cfg!(debug_assertions) {
            ApiError::InternalServerError(format!("{} ({})", detail, correlation_id))
        } else {
            ApiError::InternalServerError(correlation_id)
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data) = match self {
            ApiError::InternalServerError(correlation) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorData {
                    message: "Internal server error".to_string(),
                    details: None,
                    correlation_id: Some(correlation),
                },
            ),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiErrorData {
                    message: "Validation failed".to_string(),
                    details: Some(errors.errors().to_vec()),
                    correlation_id: None,
                },
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiErrorData::message(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiErrorData::message(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ApiErrorData::message(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiErrorData::message(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiErrorData::message(msg)),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ApiErrorData::message(msg))
            }
        };

        (status, Json(ApiResponseBody::new(status, data))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(errors) => ApiError::Validation(errors),
            AccountError::InvalidAccountId(_)
            | AccountError::InvalidEmail(_)
            | AccountError::AlreadyVerified => ApiError::BadRequest(err.to_string()),
            AccountError::InvalidActionToken(_) => ApiError::BadRequest(INVALID_TOKEN.to_string()),
            AccountError::NotFound(_) => ApiError::NotFound("Account not found".to_string()),
            AccountError::EmailAlreadyExists(_) => {
                ApiError::Conflict("An account with this email already exists".to_string())
            }
            AccountError::GoogleIdAlreadyLinked => ApiError::Conflict(err.to_string()),
            AccountError::NoSuchAccount | AccountError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_LOGIN.to_string())
            }
            AccountError::WrongAuthMethod => ApiError::Unauthorized(
                "This account uses Google sign-in. Please continue with Google.".to_string(),
            ),
            AccountError::InvalidSessionToken(_) => {
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            }
            AccountError::EmailNotVerified => ApiError::Forbidden(
                "Please verify your email address before signing in".to_string(),
            ),
            AccountError::ServiceUnavailable(_) => ApiError::ServiceUnavailable(
                "Service temporarily unavailable, please retry".to_string(),
            ),
            AccountError::IdentityProvider(_)
            | AccountError::TokenIssuance(_)
            | AccountError::Password(_)
            | AccountError::DatabaseError(_)
            | AccountError::Unknown(_) => ApiError::internal(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ApiErrorData {
    fn message(message: String) -> Self {
        Self {
            message,
            details: None,
            correlation_id: None,
        }
    }
}

/// Acknowledgement carrying only a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Minimal account profile; never includes credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub is_email_verified: bool,
    pub has_password: bool,
    pub google_linked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.as_str().to_string(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            country: account.country.clone(),
            is_email_verified: account.is_email_verified,
            has_password: account.has_usable_password(),
            google_linked: account.google_id.is_some(),
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}
