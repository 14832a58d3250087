/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - error body は {"error_code": "<status>", "error_message": "<code>"} に統一
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::account::RegistrationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub error_message: String,
}

/// Build the JSON error response shared by handlers and the access middleware.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error_code: status.as_u16().to_string(),
        error_message: message.into(),
    };

    (status, Json(body)).into_response()
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("DUPLICATE_ACCOUNT")]
    DuplicateAccount,
    #[error("UNAUTHORIZED")]
    Unauthorized,
    #[error("INTERNAL_SERVER_ERROR")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::DuplicateAccount => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string())
    }
}

impl From<RegistrationError> for AppError {
    fn from(e: RegistrationError) -> Self {
        match e {
            RegistrationError::DuplicateAccount { user_id, provider } => {
                tracing::info!(%user_id, %provider, "sign-up rejected: account exists");
                AppError::DuplicateAccount
            }
            RegistrationError::Store(err) => {
                tracing::error!(error = ?err, "sign-up failed in account store");
                AppError::Internal
            }
        }
    }
}
