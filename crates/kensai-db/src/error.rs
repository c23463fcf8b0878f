//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (kensai-core) ─────┐   raised before any write        │
//! │                                     ▼                                   │
//! │  SQLite error (sqlx::Error) ──► DbError (this module)                  │
//! │                                     │   classified by ErrorClass        │
//! │                                     ▼                                   │
//! │  ApiError (apps/server) ← status code + {code, message}                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classes
//! | Class                | Variants                                      |
//! |----------------------|-----------------------------------------------|
//! | Validation           | `Validation`                                  |
//! | Duplicate            | `UniqueViolation`                             |
//! | ReferentialIntegrity | `ForeignKeyViolation`                         |
//! | Unavailable          | `Unavailable`                                 |
//! | Storage              | `QueryFailed`, `Serialization`, `MigrationFailed`, `Internal` |

use kensai_core::ValidationError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Store operation errors.
///
/// Backend messages are kept only as diagnostic detail strings.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input failed validation; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating a client whose id already exists
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A reference points at a row that does not exist.
    ///
    /// ## When This Occurs
    /// - Saving a quote whose `clientId` is not a stored client
    #[error("Referential integrity violation: {message}")]
    ForeignKeyViolation { message: String },

    /// No connection could be obtained.
    ///
    /// ## When This Occurs
    /// - Database file can't be opened or created
    /// - Acquire timed out (pool exhausted)
    /// - Pool was closed
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored item/payment could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Coarse triage of a [`DbError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Duplicate,
    ReferentialIntegrity,
    Unavailable,
    Storage,
}

impl ErrorClass {
    /// Whether the caller sent something the store refused (4xx class).
    pub fn is_caller_fault(self) -> bool {
        matches!(
            self,
            ErrorClass::Validation | ErrorClass::Duplicate | ErrorClass::ReferentialIntegrity
        )
    }
}

impl DbError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a ForeignKeyViolation error.
    pub fn dangling(message: impl Into<String>) -> Self {
        DbError::ForeignKeyViolation {
            message: message.into(),
        }
    }

    /// Returns the error's class.
    pub fn class(&self) -> ErrorClass {
        match self {
            DbError::Validation(_) => ErrorClass::Validation,
            DbError::UniqueViolation { .. } => ErrorClass::Duplicate,
            DbError::ForeignKeyViolation { .. } => ErrorClass::ReferentialIntegrity,
            DbError::Unavailable(_) => ErrorClass::Unavailable,
            DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Serialization(_)
            | DbError::Internal(_) => ErrorClass::Storage,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// Database(UniqueViolation)     → DbError::UniqueViolation
/// Database(ForeignKeyViolation) → DbError::ForeignKeyViolation
/// Database(other)               → DbError::QueryFailed
/// PoolTimedOut / PoolClosed / Io → DbError::Unavailable
/// Other                         → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                match db_err.kind() {
                    // SQLite: "UNIQUE constraint failed: clients.id"
                    ErrorKind::UniqueViolation => {
                        let field = msg
                            .split("UNIQUE constraint failed: ")
                            .nth(1)
                            .unwrap_or("unknown")
                            .to_string();
                        DbError::UniqueViolation {
                            field,
                            value: "unknown".to_string(),
                        }
                    }
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message: msg },
                    _ => DbError::QueryFailed(msg),
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::Unavailable("timed out waiting for a connection".to_string())
            }

            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::Unavailable(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let validation: DbError = ValidationError::Required {
            field: "email".to_string(),
        }
        .into();
        assert_eq!(validation.class(), ErrorClass::Validation);
        assert_eq!(
            DbError::duplicate("client id", "C1").class(),
            ErrorClass::Duplicate
        );
        assert_eq!(
            DbError::dangling("client C9").class(),
            ErrorClass::ReferentialIntegrity
        );
        assert!(ErrorClass::ReferentialIntegrity.is_caller_fault());
        assert!(!ErrorClass::Unavailable.is_caller_fault());
        assert!(!ErrorClass::Storage.is_caller_fault());
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert_eq!(
            DbError::from(sqlx::Error::PoolTimedOut).class(),
            ErrorClass::Unavailable
        );
        assert_eq!(
            DbError::from(sqlx::Error::PoolClosed).class(),
            ErrorClass::Unavailable
        );
    }
}
