//! # kensai-sync: Snapshot Service for KENSAI
//!
//! The read side of the frontend sync contract. A frontend starts by
//! pulling one snapshot of everything and then pushes individual writes
//! through the stores in `kensai-db`.
//!
//! ## Sync Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pull / Push                                      │
//! │                                                                         │
//! │  Frontend start ──► GET /api/init ──► SyncService::initial_snapshot()  │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                               { clients, quotes,                       │
//! │                                 tasks: [], products: [],               │
//! │                                 collaborators: [] }                    │
//! │                                                                         │
//! │  Frontend edit  ──► POST /api/clients ──► ClientRepository::create     │
//! │                 ──► POST /api/quotes  ──► QuoteRepository::save        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`snapshot`] - `SyncService` and the `Snapshot` wire type
//! - [`error`] - Sync error types

pub mod error;
pub mod snapshot;

pub use error::{SyncError, SyncResult};
pub use snapshot::{Snapshot, SyncService};
