//! # API Error Types
//!
//! Maps store and sync errors onto HTTP responses.
//!
//! ## Response Shape
//! ```json
//! {
//!   "code": "DUPLICATE_KEY",
//!   "message": "client id 'C1' already exists"
//! }
//! ```
//!
//! | Class                | Code                   | Status |
//! |----------------------|------------------------|--------|
//! | Validation           | `VALIDATION_ERROR`     | 400    |
//! | (lookup miss)        | `NOT_FOUND`            | 404    |
//! | Duplicate            | `DUPLICATE_KEY`        | 409    |
//! | ReferentialIntegrity | `REFERENTIAL_INTEGRITY`| 422    |
//! | Storage              | `STORAGE_ERROR`        | 500    |
//! | Unavailable          | `UNAVAILABLE`          | 503    |
//!
//! Backend messages never become the `message`; for server-side classes
//! they are carried in `detail` for diagnostics only.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kensai_db::{DbError, ErrorClass};
use kensai_sync::SyncError;
use serde::Serialize;

/// Error returned to the frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Backend diagnostic, present only for server-side failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error codes, one per error class plus lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or missing input (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Identifier collision (409)
    DuplicateKey,

    /// Reference to a missing row (422)
    ReferentialIntegrity,

    /// Any other backend failure (500)
    StorageError,

    /// Database unreachable (503)
    Unavailable,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::DuplicateKey => StatusCode::CONFLICT,
            ErrorCode::ReferentialIntegrity => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ErrorClass> for ErrorCode {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Validation => ErrorCode::ValidationError,
            ErrorClass::Duplicate => ErrorCode::DuplicateKey,
            ErrorClass::ReferentialIntegrity => ErrorCode::ReferentialIntegrity,
            ErrorClass::Unavailable => ErrorCode::Unavailable,
            ErrorClass::Storage => ErrorCode::StorageError,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn from_class(class: ErrorClass, detail: String) -> Self {
        let code = ErrorCode::from(class);
        if class.is_caller_fault() {
            return ApiError::new(code, detail);
        }

        tracing::error!(code = ?code, error = %detail, "Request failed");
        let message = match class {
            ErrorClass::Unavailable => "Database unavailable",
            _ => "Database operation failed",
        };
        ApiError::new(code, message).with_detail(detail)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let class = err.class();
        let text = match err {
            // Without the "Validation failed:" prefix.
            DbError::Validation(inner) => inner.to_string(),
            DbError::UniqueViolation { field, value } => {
                format!("{} '{}' already exists", field, value)
            }
            DbError::ForeignKeyViolation { message } => message,
            other => other.to_string(),
        };
        ApiError::from_class(class, text)
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Storage(db) => ApiError::from(db),
            other => ApiError::from_class(other.class(), other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kensai_core::ValidationError;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        let validation = DbError::Validation(ValidationError::Required {
            field: "email".to_string(),
        });
        assert_eq!(status_of(validation), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DbError::duplicate("client id", "C1")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DbError::dangling("client 'C9' does not exist")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DbError::Unavailable("pool is closed".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DbError::QueryFailed("disk I/O error".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ApiError::not_found("Quote", "Q1")),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_backend_message_only_in_detail() {
        let err = ApiError::from(DbError::QueryFailed("no such table: quotes".to_string()));
        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(err.message, "Database operation failed");
        assert_eq!(
            err.detail.as_deref(),
            Some("Query failed: no such table: quotes")
        );
    }

    #[test]
    fn test_ledger_overflow_is_a_storage_error() {
        let err = ApiError::from(SyncError::Ledger(kensai_core::CoreError::AmountOutOfRange {
            field: "subtotal".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.detail.as_deref(),
            Some("Ledger error: Amount out of range in subtotal")
        );
    }

    #[test]
    fn test_caller_errors_have_no_detail() {
        let err = ApiError::from(DbError::duplicate("client id", "C1"));
        assert_eq!(err.message, "client id 'C1' already exists");
        assert!(err.detail.is_none());

        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["code"], "DUPLICATE_KEY");
        assert!(body.get("detail").is_none());
    }
}
