use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Invalid credentials")]
    pub error: String,
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `INVALID_CREDENTIALS`,
    /// `SESSION_EXPIRED`, `NOT_FOUND`, `CONFLICT`, `METHOD_NOT_ALLOWED`,
    /// `PAYLOAD_TOO_LARGE`, `INTERNAL_ERROR`.
    #[schema(example = "INVALID_CREDENTIALS")]
    pub code: &'static str,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// Unknown account or wrong password; the two are not distinguished.
    InvalidCredentials,
    SessionExpired,
    NotFound(String),
    Conflict(String),
    MethodNotAllowed,
    PayloadTooLarge(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    code: "VALIDATION_ERROR",
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "Invalid credentials".into(),
                    code: "INVALID_CREDENTIALS",
                },
            ),
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error: "Session expired".into(),
                    code: "SESSION_EXPIRED",
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: msg,
                    code: "NOT_FOUND",
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: msg,
                    code: "CONFLICT",
                },
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    error: "Method not allowed".into(),
                    code: "METHOD_NOT_ALLOWED",
                },
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    error: msg,
                    code: "PAYLOAD_TOO_LARGE",
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "An unexpected error occurred".into(),
                        code: "INTERNAL_ERROR",
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::Validation(format!("Invalid file name: {msg}")),
            StorageError::SizeLimitExceeded { actual, limit } => AppError::PayloadTooLarge(format!(
                "File is {actual} bytes, the limit is {limit} bytes"
            )),
            other => AppError::Internal(other.to_string()),
        }
    }
}
