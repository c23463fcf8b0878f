//! Client writes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use kensai_core::{Client, WriteAck};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// `POST /api/clients`: create a client. Never updates an existing one.
pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<Client>, JsonRejection>,
) -> ApiResult<Json<WriteAck>> {
    let Json(client) = payload?;
    let ack = state.db.clients().create(&client).await?;

    info!(id = %ack.id, "Client created");
    Ok(Json(ack))
}
