//! Health check endpoint.

use axum::extract::State;
use axum::response::IntoResponse;

use crate::error::{ApiError, ErrorCode};
use crate::AppState;

/// `GET /health`: `"OK"` while the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    if state.db.health_check().await {
        Ok("OK")
    } else {
        Err(ApiError::new(ErrorCode::Unavailable, "Database unavailable"))
    }
}
