//! # KENSAI Server
//!
//! JSON-over-HTTP API for the quoting frontend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KENSAI Server                                    │
//! │                                                                         │
//! │  Frontend ──► CORS ──► Trace ──► Router ──► routes::*                  │
//! │                                                │                        │
//! │                           ┌────────────────────┼────────────────┐       │
//! │                           ▼                    ▼                ▼       │
//! │                     SyncService        ClientRepository  QuoteRepository│
//! │                     (kensai-sync)            (kensai-db)                │
//! │                           │                    │                │       │
//! │                           └────────────► Database ◄─────────────┘       │
//! │                                          (SQLite pool)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ServerConfig`]):
//! - `KENSAI_BIND_ADDR` - interface (default: 0.0.0.0)
//! - `KENSAI_PORT` - HTTP port (default: 8000)
//! - `KENSAI_DATABASE_PATH` - SQLite file (default: kensai.db)
//! - `KENSAI_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `KENSAI_DB_ACQUIRE_TIMEOUT_SECS` - connection wait (default: 30)
//! - `KENSAI_CORS_ALLOW_ANY` - permissive CORS (default: true)

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use kensai_db::Database;
use kensai_sync::SyncService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub sync: SyncService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            sync: SyncService::new(db.clone()),
            db,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/init", get(routes::init::initial_snapshot))
        .route("/api/clients", post(routes::clients::create_client))
        .route("/api/quotes", post(routes::quotes::save_quote))
        .route(
            "/api/quotes/{id}",
            get(routes::quotes::get_quote).put(routes::quotes::replace_quote),
        )
        .route("/api/quotes/{id}/summary", get(routes::quotes::quote_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy. `allow_any` opens every origin, method and header;
/// otherwise only same-origin requests pass.
pub fn cors_layer(allow_any: bool) -> CorsLayer {
    if allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    }
}

// =============================================================================
// Router Tests
// =============================================================================
