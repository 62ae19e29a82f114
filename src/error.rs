//! Application error type and its HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{dto::MessageResponse, jwt::TokenError, validation::FieldViolation};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("request failed validation")]
    ValidationFailed(Vec<FieldViolation>),

    #[error("User already exists with this email")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authorized")]
    Unauthorized,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid user")]
    AccountNotFound,

    #[error("Token refresh is not available")]
    RefreshUnavailable,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Missing => AppError::Unauthorized,
            TokenError::Invalid => AppError::TokenInvalid,
            TokenError::Expired => AppError::TokenExpired,
        }
    }
}

#[derive(Serialize)]
struct ValidationBody {
    errors: Vec<FieldViolation>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ValidationFailed(errors) => {
                let body = ValidationBody {
                    errors: errors.clone(),
                };
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }
            AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            // Observed behaviour: failed logins answer 404, not 401. Kept as is;
            // unknown email and wrong password must stay indistinguishable.
            AppError::InvalidCredentials => StatusCode::NOT_FOUND,
            AppError::Unauthorized | AppError::TokenInvalid | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::RefreshUnavailable => StatusCode::NOT_IMPLEMENTED,
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageResponse::new("Internal server error")),
                )
                    .into_response();
            }
        };

        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
