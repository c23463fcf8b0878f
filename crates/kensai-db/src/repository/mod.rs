//! # Repository Module
//!
//! Store implementations for KENSAI.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.quotes().save(&quote)                                      │
//! │       ▼                                                                 │
//! │  QuoteRepository                                                       │
//! │  ├── save(&self, quote)       whole graph, one transaction             │
//! │  ├── list(&self)                                                       │
//! │  └── get_by_id(&self, id)                                              │
//! │       │                                                                 │
//! │       │  Database::begin() / acquire()                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module also exposes a connection-level `fetch_all` so a caller can
//! read several tables inside one transaction.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - insert-only clients
//! - [`QuoteRepository`](quote::QuoteRepository) - quotes with items and payments

pub mod client;
pub mod quote;
