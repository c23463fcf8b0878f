//! # Validation Module
//!
//! Input validation for clients and quotes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (axum Json extractor)                          │
//! │  └── Shape: required keys present, types match                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by the repositories before writing)      │
//! │  ├── Required strings are non-blank                                    │
//! │  ├── Email / date formats                                              │
//! │  └── Non-negative numbers                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── PRIMARY KEY (duplicate ids)                                       │
//! │  └── FOREIGN KEY (quote → client)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quote `status` and `paymentCondition` are intentionally unchecked: any
//! string is stored as-is.
//!
//! ## Usage
//! ```rust
//! use kensai_core::validation::{validate_email, parse_quote_date};
//!
//! assert!(validate_email("a@acme.com").is_ok());
//! assert!(parse_quote_date("2024-01-01").is_some());
//! ```

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;
use crate::types::{Client, Quote};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_ID_LEN: usize = 100;
const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;
const MAX_SHORT_LEN: usize = 50;
const MAX_ADDRESS_LEN: usize = 500;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required text field: non-blank and at most `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    validate_max_len(field, value, max)
}

/// Validates an optional text field's length.
pub fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates an externally assigned identifier.
///
/// ## Rules
/// - Must not be blank
/// - At most 100 characters
/// - No leading/trailing whitespace (ids are compared byte-for-byte)
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    validate_required(field, id, MAX_ID_LEN)?;
    if id.trim() != id {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not have surrounding whitespace".to_string(),
        });
    }
    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Non-blank, at most 254 characters
/// - Exactly one `@` with text on both sides
/// - No whitespace anywhere (`ventas@localhost` is accepted)
///
/// ## Example
/// ```rust
/// use kensai_core::validation::validate_email;
///
/// assert!(validate_email("ventas@kensai.mx").is_ok());
/// assert!(validate_email("ventas@").is_err());
/// assert!(validate_email("no-at-sign").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email, MAX_EMAIL_LEN)?;

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing '@'"))?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain"));
    }

    Ok(())
}

/// Validates a non-negative integer (credit days).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate fraction.
///
/// ## Rules
/// - Finite (no NaN / infinity)
/// - Not negative
///
/// Rates above 1.0 are unusual but not rejected.
pub fn validate_tax_rate(rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "taxRate".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if rate < 0.0 {
        return Err(ValidationError::Negative {
            field: "taxRate".to_string(),
        });
    }
    Ok(())
}

/// Parses a quote date.
///
/// Accepts a plain calendar date (`2024-01-01`) or a full RFC 3339
/// timestamp (`2024-01-01T10:30:00.000Z`, what `Date.toISOString()` emits).
pub fn parse_quote_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Validates a quote date string.
pub fn validate_quote_date(value: &str) -> ValidationResult<()> {
    validate_required("date", value, MAX_SHORT_LEN)?;
    if parse_quote_date(value).is_none() {
        return Err(ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "must be an ISO-8601 date".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a client before insert.
pub fn validate_client(client: &Client) -> ValidationResult<()> {
    validate_id("id", &client.id)?;
    validate_required("name", &client.name, MAX_NAME_LEN)?;
    validate_email(&client.email)?;
    validate_required("creditStatus", &client.credit_status, MAX_SHORT_LEN)?;
    validate_max_len("phone", &client.phone, MAX_SHORT_LEN)?;
    validate_max_len("address", &client.address, MAX_ADDRESS_LEN)?;
    validate_non_negative("creditDays", client.credit_days)?;
    Ok(())
}

/// Validates a quote header before save.
///
/// Items and payments are open maps and carry no rules of their own.
pub fn validate_quote(quote: &Quote) -> ValidationResult<()> {
    validate_id("id", &quote.id)?;
    validate_required("quoteNumber", &quote.quote_number, MAX_SHORT_LEN)?;
    validate_quote_date(&quote.date)?;
    validate_id("clientId", &quote.client_id)?;
    validate_tax_rate(quote.tax_rate)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client {
            id: "C1".to_string(),
            name: "Acme".to_string(),
            email: "a@acme.com".to_string(),
            phone: String::new(),
            address: String::new(),
            credit_status: "good".to_string(),
            credit_days: 0,
        }
    }

    fn quote() -> Quote {
        Quote {
            id: "Q1".to_string(),
            quote_number: "Q-100".to_string(),
            date: "2024-01-01".to_string(),
            client_id: "C1".to_string(),
            status: "draft".to_string(),
            payment_condition: "net30".to_string(),
            tax_rate: 0.16,
            items: Vec::new(),
            payments: Vec::new(),
            expires: None,
            company: None,
            notes: None,
            salesperson_id: None,
            acceptance_date: None,
        }
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", "C1").is_ok());
        assert!(validate_id("id", "").is_err());
        assert!(validate_id("id", "   ").is_err());
        assert!(validate_id("id", " C1").is_err());
        assert!(validate_id("id", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@acme.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("acme.com").is_err());
        assert!(validate_email("@acme.com").is_err());
        assert!(validate_email("a@localhost").is_ok());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a b@acme.com").is_err());
        assert!(validate_email("a@b@acme.com").is_err());
    }

    #[test]
    fn test_parse_quote_date() {
        assert_eq!(
            parse_quote_date("2024-01-01"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_quote_date("2024-03-05T18:30:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(parse_quote_date("01/01/2024").is_none());
        assert!(parse_quote_date("2024-02-30").is_none());
    }

    #[test]
    fn test_validate_client() {
        assert!(validate_client(&client()).is_ok());

        let mut c = client();
        c.name = " ".to_string();
        assert_eq!(
            validate_client(&c),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );

        let mut c = client();
        c.credit_status = String::new();
        assert!(validate_client(&c).is_err());

        let mut c = client();
        c.credit_days = -1;
        assert!(matches!(
            validate_client(&c),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_validate_quote() {
        assert!(validate_quote(&quote()).is_ok());

        let mut q = quote();
        q.status = String::new();
        q.payment_condition = String::new();
        assert!(validate_quote(&q).is_ok(), "status is free-form");

        let mut q = quote();
        q.client_id = String::new();
        assert!(validate_quote(&q).is_err());

        let mut q = quote();
        q.date = "tomorrow".to_string();
        assert!(validate_quote(&q).is_err());

        let mut q = quote();
        q.tax_rate = -0.1;
        assert!(validate_quote(&q).is_err());

        let mut q = quote();
        q.tax_rate = f64::NAN;
        assert!(validate_quote(&q).is_err());
    }
}
