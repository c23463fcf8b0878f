//! Quote writes, lookups and summaries.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use kensai_core::{Quote, QuoteSummary, ValidationError, WriteAck};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `POST /api/quotes`: create or fully replace a quote graph.
pub async fn save_quote(
    State(state): State<AppState>,
    payload: Result<Json<Quote>, JsonRejection>,
) -> ApiResult<Json<WriteAck>> {
    let Json(quote) = payload?;
    store(&state, &quote).await
}

/// `PUT /api/quotes/{id}`: same as POST, addressed by id.
///
/// The id in the path must be the id in the body.
pub async fn replace_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Quote>, JsonRejection>,
) -> ApiResult<Json<WriteAck>> {
    let Json(quote) = payload?;
    if quote.id != id {
        return Err(ApiError::validation(
            ValidationError::Mismatch {
                field: "id".to_string(),
                expected: id,
                actual: quote.id,
            }
            .to_string(),
        ));
    }
    store(&state, &quote).await
}

async fn store(state: &AppState, quote: &Quote) -> ApiResult<Json<WriteAck>> {
    let ack = state.db.quotes().save(quote).await?;

    info!(
        id = %ack.id,
        items = quote.items.len(),
        payments = quote.payments.len(),
        "Quote stored"
    );
    Ok(Json(ack))
}

/// `GET /api/quotes/{id}`
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Quote>> {
    state
        .db
        .quotes()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Quote", &id))
}

/// `GET /api/quotes/{id}/summary`: totals, balance and credit due date.
pub async fn quote_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<QuoteSummary>> {
    state
        .sync
        .quote_summary(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Quote", &id))
}
