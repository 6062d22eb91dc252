use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::dto::ErrorResponse;
use crate::auth::AuthError;
use crate::services::image_service::ImageError;
use crate::services::llm_client::LlmError;
use crate::services::message_service::MessageError;
use crate::services::payment::PaymentError;
use crate::storage::repository::RepositoryError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Single error contract for every endpoint: a status code plus
/// `{ "success": false, "message": ... }`.
///
/// Server-side causes are logged and replaced by a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("You don't have enough credits to use this feature!")]
    InsufficientCredits,
    #[error("{0}")]
    NotFound(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InsufficientCredits => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Repository(_)
            | AppError::Payment(_)
            | AppError::Llm(_)
            | AppError::Image(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::EmptyPrompt => AppError::Validation(err.to_string()),
            MessageError::InsufficientCredits => AppError::InsufficientCredits,
            MessageError::ChatNotFound => AppError::NotFound(err.to_string()),
            MessageError::Repository(e) => AppError::Repository(e),
            MessageError::Llm(e) => AppError::Llm(e),
            MessageError::Image(e) => AppError::Image(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Encode(e) => AppError::Internal(format!("Token encoding failed: {}", e)),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
