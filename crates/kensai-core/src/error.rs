//! # Error Types
//!
//! Domain-specific error types for kensai-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kensai-core (this file)                                               │
//! │  ├── CoreError        - Domain rule failures (ledger math)             │
//! │  └── ValidationError  - Malformed or missing input fields              │
//! │                                                                         │
//! │  kensai-db                                                             │
//! │  └── DbError          - Storage failures, wraps ValidationError        │
//! │                                                                         │
//! │  apps/server                                                           │
//! │  └── ApiError         - What the frontend sees ({code, message})       │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → ApiError → Frontend                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A quote's stored date could not be read as a calendar date.
    ///
    /// ## When This Occurs
    /// Computing a credit due date for a quote whose date predates input
    /// validation or was written by another tool.
    #[error("Quote {quote_id} has an unreadable date: '{value}'")]
    InvalidQuoteDate { quote_id: String, value: String },

    /// A monetary figure could not be represented in cents.
    #[error("Amount out of range in {field}")]
    AmountOutOfRange { field: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write is attempted; a payload that fails here is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (bad email, unparseable date, NaN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two identifiers that must agree do not.
    #[error("{field} mismatch: expected '{expected}', got '{actual}'")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Mismatch { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
