//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookmarks_core::{StoreError, BOOKMARKS_USER_ID_FKEY, USERS_EMAIL_KEY};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "BAD_REQUEST")]
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Authentication required")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing request fields
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Email already in use")]
    EmailInUse,

    /// Login with an email nobody signed up with
    #[error("User not found")]
    UserNotFound,

    /// Login with a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, or owned by another user
    #[error("Bookmark not found")]
    BookmarkNotFound,

    #[error("Authentication required")]
    Unauthenticated,

    /// Body larger than the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BookmarkNotFound => StatusCode::BAD_REQUEST,
            AppError::EmailInUse | AppError::UserNotFound | AppError::InvalidCredentials => {
                StatusCode::FORBIDDEN
            }
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Validation(msg) => {
                ApiError::bad_request("Invalid request body").with_details(msg)
            }
            AppError::EmailInUse => ApiError::forbidden("Email already in use"),
            // Same body for both so a caller cannot tell which emails exist
            AppError::UserNotFound | AppError::InvalidCredentials => {
                ApiError::forbidden("Credentials incorrect")
            }
            AppError::BookmarkNotFound => ApiError::bad_request("Bookmark not found"),
            AppError::Unauthenticated => ApiError::unauthorized(),
            AppError::PayloadTooLarge => {
                ApiError::new("PAYLOAD_TOO_LARGE", "Request body too large")
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store operation failed");
                ApiError::new("DATABASE_ERROR", "Database operation failed")
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ApiError::internal_error()
            }
        };

        (status, Json(error)).into_response()
    }
}

/// Translate store failures from user writes
///
/// A duplicate `users.email` is the only constraint a caller can trip here.
pub fn map_user_write_error(err: StoreError) -> AppError {
    if err.is_unique_violation(USERS_EMAIL_KEY) {
        AppError::EmailInUse
    } else {
        AppError::Store(err)
    }
}

/// Translate store failures from bookmark inserts
///
/// The owner foreign key only fails if the caller's account disappeared
/// after the request was authenticated.
pub fn map_bookmark_write_error(err: StoreError) -> AppError {
    if err.is_foreign_key_violation(BOOKMARKS_USER_ID_FKEY) {
        AppError::Unauthenticated
    } else {
        AppError::Store(err)
    }
}
