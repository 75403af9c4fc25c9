use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app::error::BoardError;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Maps a service failure to a response. Server-side failures are logged
    /// with `context` and reported with it instead of the underlying detail.
    pub fn from_service(err: BoardError, context: &'static str) -> Self {
        match err {
            BoardError::InvalidInput(message) => Self::bad_request(message),
            BoardError::NotFound(_) => Self::not_found(err.to_string()),
            BoardError::AlreadyExists(_) => Self::conflict(err.to_string()),
            BoardError::Database(_)
            | BoardError::Storage(_)
            | BoardError::Timestamp(_)
            | BoardError::Task(_) => {
                tracing::error!(error = ?err, "{}", context);
                Self::internal(context)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
