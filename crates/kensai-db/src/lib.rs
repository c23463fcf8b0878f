//! # kensai-db: Storage Layer for KENSAI
//!
//! SQLite persistence for clients and quotes, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KENSAI Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /api/quotes)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kensai-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ClientRepo    │    │ 001_initial  │  │   │
//! │  │   │ acquire()     │◄───│ QuoteRepo     │    │              │  │   │
//! │  │   │ begin()       │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (kensai.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and scoped connections
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Client and quote stores
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kensai_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kensai.db")).await?;
//!
//! db.clients().create(&client).await?;
//! db.quotes().save(&quote).await?;
//! let quotes = db.quotes().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ErrorClass};
pub use pool::{Database, DbConfig};

pub use repository::client::ClientRepository;
pub use repository::quote::QuoteRepository;
