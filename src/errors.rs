use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::booking_store::{BookingError, StoreError};
use crate::services::shell::ShellError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Rejected input; the message is shown to the user as-is.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("state lock poisoned")]
    Poisoned,
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Store(e) => AppError::Store(e),
            e => AppError::Invalid(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Shell(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
