//! # Ledger Module
//!
//! Totals, balances and credit due dates for a quote.
//!
//! ## Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quote Summary                                      │
//! │                                                                         │
//! │  items ──► line = price × quantity   (items lacking either: skipped)   │
//! │              │                                                          │
//! │              ▼                                                          │
//! │           subtotal ──► tax = subtotal × taxRate ──► total               │
//! │                                                        │                │
//! │  payments ──► paid = Σ amount ─────────────────────────┤                │
//! │                                                        ▼                │
//! │                                           balance = total − paid        │
//! │                                                                         │
//! │  client.creditDays > 0 ──► due date = quote date + creditDays          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items and payments are open maps, so only the fields the frontend
//! conventionally writes are read (`quantity`/`qty`, `price`/`unitPrice`,
//! `amount`). Everything here is read-only: nothing is written back into
//! the quote.
//!
//! Figures that do not fit in `i64` cents fail with
//! [`CoreError::AmountOutOfRange`] naming the figure.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Client, Quote, QuoteItem};
use crate::validation::parse_quote_date;

/// Balances at or under this many cents count as settled.
pub const SETTLED_TOLERANCE_CENTS: i64 = 5;

/// How much of a quote has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentState {
    /// No payments recorded.
    Unpaid,
    /// Some money received, balance still open.
    Partial,
    /// Paid in full (within tolerance).
    Paid,
}

/// Derived figures for one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteSummary {
    pub quote_id: String,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub paid: Money,
    pub balance: Money,
    pub payment_state: PaymentState,
    /// Items that contributed to the subtotal.
    pub priced_items: usize,
    /// Items without a numeric quantity and price.
    pub unpriced_items: usize,
    /// Set only when the client buys on credit terms.
    #[ts(as = "Option<String>")]
    pub credit_due_date: Option<NaiveDate>,
}

/// Line total of one item, or `None` when the item carries no numeric
/// quantity and price.
pub fn line_total(item: &QuoteItem) -> CoreResult<Option<Money>> {
    let (Some(quantity), Some(price)) = (item.quantity(), item.unit_price()) else {
        return Ok(None);
    };
    let unit = Money::from_major_f64(price).ok_or_else(|| out_of_range("price"))?;
    unit.scale(quantity).map(Some).ok_or_else(|| out_of_range("quantity"))
}

fn out_of_range(field: &str) -> CoreError {
    CoreError::AmountOutOfRange {
        field: field.to_string(),
    }
}

/// Sum of all payment amounts. Payments without a numeric `amount` count
/// as zero.
pub fn amount_paid(quote: &Quote) -> CoreResult<Money> {
    quote
        .payments
        .iter()
        .filter_map(|p| p.amount())
        .try_fold(Money::zero(), |paid, amount| {
            Money::from_major_f64(amount)
                .and_then(|amount| paid.checked_add(amount))
                .ok_or_else(|| out_of_range("amount"))
        })
}

/// Classifies a paid amount against a total.
pub fn payment_state(total: Money, paid: Money) -> PaymentState {
    let settled_at = total.cents().saturating_sub(SETTLED_TOLERANCE_CENTS);
    if paid.cents() >= settled_at && paid.is_positive() {
        PaymentState::Paid
    } else if paid.is_positive() {
        PaymentState::Partial
    } else if total.cents() <= SETTLED_TOLERANCE_CENTS {
        // Nothing owed and nothing paid.
        PaymentState::Paid
    } else {
        PaymentState::Unpaid
    }
}

/// Due date for a quote issued to a client on credit terms.
///
/// Returns `Ok(None)` when the client has no credit days.
pub fn credit_due_date(quote: &Quote, client: &Client) -> CoreResult<Option<NaiveDate>> {
    if !client.has_credit_terms() {
        return Ok(None);
    }
    let issued = parse_quote_date(&quote.date).ok_or_else(|| CoreError::InvalidQuoteDate {
        quote_id: quote.id.clone(),
        value: quote.date.clone(),
    })?;
    // credit_days > 0 was checked above
    Ok(issued.checked_add_days(Days::new(client.credit_days as u64)))
}

/// Builds the full summary for a quote.
///
/// `client` is the quote's client when known; without it no due date is
/// computed.
pub fn summarize(quote: &Quote, client: Option<&Client>) -> CoreResult<QuoteSummary> {
    let mut subtotal = Money::zero();
    let mut priced_items = 0;
    for item in &quote.items {
        if let Some(line) = line_total(item)? {
            subtotal = subtotal
                .checked_add(line)
                .ok_or_else(|| out_of_range("subtotal"))?;
            priced_items += 1;
        }
    }

    let tax = subtotal
        .calculate_tax(quote.tax()?)
        .ok_or_else(|| out_of_range("tax"))?;
    let total = subtotal.checked_add(tax).ok_or_else(|| out_of_range("total"))?;
    let paid = amount_paid(quote)?;
    let balance = total.checked_sub(paid).ok_or_else(|| out_of_range("balance"))?;
    let credit_due_date = match client {
        Some(client) => credit_due_date(quote, client)?,
        None => None,
    };

    Ok(QuoteSummary {
        quote_id: quote.id.clone(),
        subtotal,
        tax,
        total,
        paid,
        balance,
        payment_state: payment_state(total, paid),
        priced_items,
        unpriced_items: quote.items.len() - priced_items,
        credit_due_date,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
