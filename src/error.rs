//! Error types for Maktaba server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::request::RequestStatus;

/// Application error codes exposed in the JSON error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NoSuchData = 5,
    BadValue = 6,
    Duplicate = 7,
    BookUnavailable = 8,
    MaxBorrowsReached = 9,
    AlreadyProcessed = 10,
}

/// Main application error type
///
/// One variant per failure kind the ledger and its surrounding API can
/// produce; business-rule variants carry the context the caller needs
/// (current status, limit values, remaining availability).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("You already have a pending request for this book")]
    DuplicateRequest,

    #[error("Borrowing limit reached ({current}/{limit})")]
    BorrowLimitExceeded { current: i64, limit: i64 },

    #[error("Book is not available for borrowing ({available} copies available)")]
    BookUnavailable { available: i32 },

    #[error("Request has already been processed (current status: {current_status})")]
    AlreadyProcessed { current_status: RequestStatus },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg.clone())
            }
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::DuplicateRequest => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, self.to_string())
            }
            AppError::BorrowLimitExceeded { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::MaxBorrowsReached,
                self.to_string(),
            ),
            AppError::BookUnavailable { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BookUnavailable,
                self.to_string(),
            ),
            AppError::AlreadyProcessed { .. } => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyProcessed, self.to_string())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
