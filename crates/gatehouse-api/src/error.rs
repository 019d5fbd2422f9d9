//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input (bad email shape, short password)
    #[error("{0}")]
    Validation(String),

    /// Signup against an email that already has an account
    #[error("Email already in use")]
    EmailInUse,

    /// Login failure; deliberately identical for an unknown email and
    /// a wrong password so accounts cannot be enumerated
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid session
    #[error("unauthorized")]
    Unauthorized,

    /// Valid session, insufficient role
    #[error("forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] gatehouse_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] gatehouse_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::EmailInUse => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::Database(err) => {
                error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Auth(err) => {
                error!("Auth error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
