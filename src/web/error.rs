//! JSON error responses for the API

use crate::comments::{FieldErrors, SubmitError};
use crate::db::StoreError;
use crate::email::EmailError;
use crate::moderation::ConsoleError;
use crate::rate_limit::RateLimitError;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

/// Every error a handler can return. Rendered as `{"error": message}`, or
/// `{"errors": {field: message}}` for validation failures.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound,
    Conflict(String),
    Validation(FieldErrors),
    TooManyRequests { retry_after_seconds: u64 },
    /// Public message; the cause is logged where the error is converted.
    Internal(&'static str),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) => write!(f, "{}", msg),
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) | ApiError::Internal(msg) => {
                write!(f, "{}", msg)
            }
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Validation(errors) => write!(f, "{} invalid field(s)", errors.len()),
            ApiError::TooManyRequests {
                retry_after_seconds,
            } => write!(
                f,
                "Too many requests. Please try again in {} seconds.",
                retry_after_seconds
            ),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            ApiError::Validation(errors) => builder.json(json!({ "errors": errors })),
            ApiError::TooManyRequests {
                retry_after_seconds,
            } => builder
                .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
                .json(json!({ "error": self.to_string() })),
            _ => builder.json(json!({ "error": self.to_string() })),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(e) => {
                log::error!("Database error: {}", e);
                ApiError::Internal("Unable to load or save data.")
            }
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(errors) => ApiError::Validation(errors),
            SubmitError::Store(e) => e.into(),
        }
    }
}

impl From<ConsoleError> for ApiError {
    fn from(e: ConsoleError) -> Self {
        match e {
            ConsoleError::EmptySelection => ApiError::BadRequest(e.to_string()),
            ConsoleError::Store(e) => e.into(),
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(e: EmailError) -> Self {
        if e.is_client_error() {
            ApiError::BadRequest(e.public_message().to_string())
        } else {
            log::error!("Contact relay failed: {}", e);
            ApiError::Internal(e.public_message())
        }
    }
}

impl From<RateLimitError> for ApiError {
    fn from(e: RateLimitError) -> Self {
        ApiError::TooManyRequests {
            retry_after_seconds: e.retry_after_seconds,
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<actix_session::SessionInsertError> for ApiError {
    fn from(e: actix_session::SessionInsertError) -> Self {
        log::error!("Failed to write session: {}", e);
        ApiError::Internal("Session error.")
    }
}

impl From<actix_session::SessionGetError> for ApiError {
    fn from(e: actix_session::SessionGetError) -> Self {
        log::error!("Failed to read session: {}", e);
        ApiError::Internal("Session error.")
    }
}
