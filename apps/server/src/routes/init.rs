//! Startup snapshot.

use axum::extract::State;
use axum::Json;
use kensai_sync::Snapshot;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/init`: everything the frontend loads on startup.
pub async fn initial_snapshot(State(state): State<AppState>) -> ApiResult<Json<Snapshot>> {
    let snapshot = state.sync.initial_snapshot().await?;
    Ok(Json(snapshot))
}
