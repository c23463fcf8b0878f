//! # HTTP Routes
//!
//! One module per resource. Handlers only decode the request, call a
//! store or the sync service, and encode the result; they hold no rules.
//!
//! - [`init`] - `GET /api/init`
//! - [`clients`] - `POST /api/clients`
//! - [`quotes`] - quote writes, lookups and summaries
//! - [`health`] - `GET /health`

pub mod clients;
pub mod health;
pub mod init;
pub mod quotes;
