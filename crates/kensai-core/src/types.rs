//! # Domain Types
//!
//! Core domain types shared by the store, the snapshot service and the
//! HTTP layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐         ┌──────────────────────────────────────┐  │
//! │  │     Client      │◄── id ──│               Quote                  │  │
//! │  │  ─────────────  │         │  ──────────────────────────────────  │  │
//! │  │  id (external)  │         │  id (external)     status (open)     │  │
//! │  │  name, email    │         │  quote_number      payment_condition │  │
//! │  │  credit_status  │         │  date (ISO-8601)   tax_rate (0.16)   │  │
//! │  │  credit_days    │         │                                      │  │
//! │  └─────────────────┘         │  items:    [QuoteItem]  (ordered)    │  │
//! │                              │  payments: [Payment]   (audit order) │  │
//! │                              └──────────────────────────────────────┘  │
//! │                                                                         │
//! │  QuoteItem / Payment are open field maps: whatever the frontend sends  │
//! │  is stored and handed back untouched.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! All types serialize with camelCase keys so they match the frontend's
//! `types.ts` (`quoteNumber`, `clientId`, `creditStatus`, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// An open set of fields, in the order they were supplied.
pub type Fields = Map<String, Value>;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// Quotes carry their rate as a fraction (`0.16`). Converting once to an
/// integer rate keeps the tax math on [`Money`](crate::Money) exact.
/// 1600 bps = 16%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a fraction (`0.16` → 1600 bps).
    ///
    /// Returns `None` for negative or non-finite fractions and for rates
    /// too large to hold in basis points.
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        if !fraction.is_finite() || fraction < 0.0 {
            return None;
        }
        let bps = (fraction * 10_000.0).round();
        if bps > f64::from(u32::MAX) {
            return None;
        }
        Some(TaxRate(bps as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a fraction (for display only).
    #[inline]
    pub fn fraction(&self) -> f64 {
        f64::from(self.0) / 10_000.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer that quotes are issued to.
///
/// `id` is assigned by the frontend and never changes once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Credit standing, e.g. `"Contado"` / `"Credito"` or `"good"` / `"hold"`.
    pub credit_status: String,
    /// Payment terms in days. Zero means payment on delivery.
    #[serde(default)]
    pub credit_days: i64,
}

impl Client {
    /// Whether this client buys on credit terms.
    #[inline]
    pub fn has_credit_terms(&self) -> bool {
        self.credit_days > 0
    }
}

// =============================================================================
// Quote Item
// =============================================================================

/// A line item on a quote.
///
/// The frontend owns the item shape (`description`, `quantity`, `price`,
/// `productId`, ...). The backend keeps every field and only reads the
/// numeric ones when it needs a total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteItem(pub Fields);

impl QuoteItem {
    /// Quantity, read from `quantity` or `qty`.
    pub fn quantity(&self) -> Option<f64> {
        number_field(&self.0, &["quantity", "qty"])
    }

    /// Unit price, read from `price` or `unitPrice`.
    pub fn unit_price(&self) -> Option<f64> {
        number_field(&self.0, &["price", "unitPrice"])
    }

    /// Returns the underlying field map.
    pub fn fields(&self) -> &Fields {
        &self.0
    }
}

impl From<Fields> for QuoteItem {
    fn from(fields: Fields) -> Self {
        QuoteItem(fields)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment recorded against a quote (deposit, settlement, credit payment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payment(pub Fields);

impl Payment {
    /// Amount paid, read from `amount`.
    pub fn amount(&self) -> Option<f64> {
        number_field(&self.0, &["amount"])
    }

    /// Returns the underlying field map.
    pub fn fields(&self) -> &Fields {
        &self.0
    }
}

impl From<Fields> for Payment {
    fn from(fields: Fields) -> Self {
        Payment(fields)
    }
}

/// Reads the first of `keys` that holds a number (or a numeric string).
fn number_field(fields: &Fields, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

// =============================================================================
// Quote
// =============================================================================

/// A sales quote together with everything it owns.
///
/// Saving a quote always replaces the whole graph: the stored items and
/// payments become exactly the ones in this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Quote {
    pub id: String,
    /// Display number such as `"Q-100"`. Not unique.
    pub quote_number: String,
    /// ISO-8601 date (`2024-01-01`), stored verbatim.
    pub date: String,
    pub client_id: String,
    /// Free-form status. No transitions are enforced.
    pub status: String,
    pub payment_condition: String,
    /// Fraction applied to line totals (`0.16` = 16%).
    pub tax_rate: f64,
    #[ts(type = "Array<Record<string, unknown>>")]
    pub items: Vec<QuoteItem>,
    #[serde(default)]
    #[ts(type = "Array<Record<string, unknown>>")]
    pub payments: Vec<Payment>,

    // Printed-quote details. Optional, stored as sent.
    /// Validity date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    /// Issuing company block (name, address, logo, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, unknown> | null")]
    pub company: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_date: Option<String>,
}

impl Quote {
    /// Returns the quote's tax rate.
    pub fn tax(&self) -> CoreResult<TaxRate> {
        TaxRate::from_fraction(self.tax_rate).ok_or_else(|| CoreError::AmountOutOfRange {
            field: "taxRate".to_string(),
        })
    }
}

// =============================================================================
// Write Acknowledgement
// =============================================================================

/// Outcome label of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum WriteStatus {
    /// A client row was created.
    Success,
    /// A quote graph was stored.
    Saved,
}

/// `{status, id}` returned by every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WriteAck {
    pub status: WriteStatus,
    pub id: String,
}

impl WriteAck {
    pub fn success(id: impl Into<String>) -> Self {
        WriteAck {
            status: WriteStatus::Success,
            id: id.into(),
        }
    }

    pub fn saved(id: impl Into<String>) -> Self {
        WriteAck {
            status: WriteStatus::Saved,
            id: id.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
