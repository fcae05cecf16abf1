//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::{
    ERR_MSG_INVALID_CREDENTIALS, ERR_MSG_INVALID_TOKEN, ERR_MSG_INVALID_TOKEN_TYPE,
    ERR_MSG_MISSING_HEADER, ERR_MSG_USER_NOT_FOUND,
};
use crate::domain::ValidationError;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending field
    #[schema(example = "cpf")]
    pub field: String,
    /// Why it was rejected
    #[schema(example = "invalid CPF")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("{}", ERR_MSG_INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("{}", ERR_MSG_MISSING_HEADER)]
    MissingHeader,

    #[error("{}", ERR_MSG_INVALID_TOKEN)]
    InvalidToken,

    #[error("{}", ERR_MSG_INVALID_TOKEN_TYPE)]
    InvalidTokenType,

    // Resource errors
    #[error("{}", ERR_MSG_USER_NOT_FOUND)]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    // Validation
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(inline)]
    error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::MissingHeader => "MISSING_HEADER",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::InvalidTokenType => "INVALID_TOKEN_TYPE",
            AppError::NotFound => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::MissingHeader
            | AppError::InvalidToken
            | AppError::InvalidTokenType => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(fields) => match fields.as_slice() {
                [only] => only.message.clone(),
                _ => "request validation failed".to_string(),
            },

            // Hide details for internal errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.user_message();
        let code = self.code().to_string();
        let fields = match self {
            AppError::Validation(fields) => fields,
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(vec![FieldError::new(err.field(), err.to_string())])
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, msg)])
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
