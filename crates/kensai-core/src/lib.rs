//! # kensai-core: Domain Model for the KENSAI Quote Backend
//!
//! Clients, quotes and the rules around them, as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KENSAI Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │    Clients ──► Quote form ──► History ──► Accounting           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               apps/server  +  kensai-sync                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kensai-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │ validation│  │   │
//! │  │   │  Client   │  │   Money   │  │  totals   │  │   rules   │  │   │
//! │  │   │  Quote    │  │  TaxRate  │  │  balance  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kensai-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Client, Quote, QuoteItem, Payment, WriteAck
//! - [`money`] - Money type with integer arithmetic
//! - [`ledger`] - Quote totals, balances and credit due dates
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kensai_core::{ledger, Quote};
//!
//! let quote: Quote = serde_json::from_str(r#"{
//!     "id": "Q1", "quoteNumber": "Q-100", "date": "2024-01-01",
//!     "clientId": "C1", "status": "draft", "paymentCondition": "net30",
//!     "taxRate": 0.16, "items": [{"desc": "Widget", "qty": 2, "price": 10}]
//! }"#).unwrap();
//!
//! let summary = ledger::summarize(&quote, None).unwrap();
//! assert_eq!(summary.total.cents(), 2320);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{PaymentState, QuoteSummary};
pub use money::Money;
pub use types::*;
