//! # Snapshot Service
//!
//! Full-state reads for the frontend.
//!
//! Both listings run on one connection inside one read transaction, so a
//! snapshot never mixes quotes from before a save with clients from after
//! it. Any failure fails the whole call.

use kensai_core::ledger::summarize;
use kensai_core::{Client, Quote, QuoteSummary};
use kensai_db::repository::{client, quote};
use kensai_db::{Database, DbError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::SyncResult;

/// Everything a frontend needs on startup.
///
/// `tasks`, `products` and `collaborators` are reserved for entity types
/// the store doesn't hold yet and are always empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Snapshot {
    pub clients: Vec<Client>,
    pub quotes: Vec<Quote>,
    #[ts(type = "Array<unknown>")]
    pub tasks: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    pub products: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    pub collaborators: Vec<Value>,
}

/// Read-side service over the client and quote stores.
#[derive(Debug, Clone)]
pub struct SyncService {
    db: Database,
}

impl SyncService {
    /// Creates a new SyncService.
    pub fn new(db: Database) -> Self {
        SyncService { db }
    }

    /// Reads every client and quote in one transaction.
    ///
    /// An empty store yields an all-empty snapshot.
    ///
    /// ## Errors
    /// * `DbError::Unavailable` - no connection could be obtained
    /// * any other `DbError` - a listing failed; nothing is returned
    pub async fn initial_snapshot(&self) -> SyncResult<Snapshot> {
        let mut tx = self.db.begin().await?;

        let clients = client::fetch_all(&mut tx).await?;
        let quotes = quote::fetch_all(&mut tx).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            clients = clients.len(),
            quotes = quotes.len(),
            "Snapshot assembled"
        );

        Ok(Snapshot {
            clients,
            quotes,
            ..Snapshot::default()
        })
    }

    /// Totals, balance and credit due date for one quote.
    ///
    /// Returns `Ok(None)` when the quote doesn't exist.
    pub async fn quote_summary(&self, quote_id: &str) -> SyncResult<Option<QuoteSummary>> {
        let mut tx = self.db.begin().await?;

        let Some(quote) = quote::fetch_by_id(&mut tx, quote_id).await? else {
            return Ok(None);
        };
        let client = client::fetch_by_id(&mut tx, &quote.client_id).await?;

        tx.commit().await.map_err(DbError::from)?;

        debug!(id = %quote.id, client_found = client.is_some(), "Summarizing quote");
        Ok(Some(summarize(&quote, client.as_ref())?))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kensai_core::PaymentState;
    use kensai_db::{DbConfig, ErrorClass};
    use serde_json::json;

    async fn setup() -> (Database, SyncService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = SyncService::new(db.clone());
        (db, service)
    }

    fn acme(credit_days: i64) -> Client {
        serde_json::from_value(json!({
            "id": "C1",
            "name": "Acme",
            "email": "a@acme.com",
            "creditStatus": "good",
            "creditDays": credit_days
        }))
        .unwrap()
    }

    fn q1() -> Quote {
        serde_json::from_value(json!({
            "id": "Q1",
            "quoteNumber": "Q-100",
            "date": "2024-01-01",
            "clientId": "C1",
            "status": "draft",
            "paymentCondition": "net30",
            "taxRate": 0.16,
            "items": [{"desc": "Widget", "qty": 2}],
            "payments": []
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_snapshot() {
        let (_db, service) = setup().await;

        let snapshot = service.initial_snapshot().await.unwrap();
        assert_eq!(snapshot, Snapshot::default());

        let wire = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            wire,
            json!({
                "clients": [],
                "quotes": [],
                "tasks": [],
                "products": [],
                "collaborators": []
            })
        );
    }

    #[tokio::test]
    async fn test_snapshot_contains_saved_graph() {
        let (db, service) = setup().await;
        db.clients().create(&acme(0)).await.unwrap();
        db.quotes().save(&q1()).await.unwrap();

        let snapshot = service.initial_snapshot().await.unwrap();
        assert_eq!(snapshot.clients, vec![acme(0)]);
        assert_eq!(snapshot.quotes, vec![q1()]);
        assert!(snapshot.tasks.is_empty());

        let wire = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(wire["quotes"][0]["items"][0], json!({"desc": "Widget", "qty": 2}));
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let (db, service) = setup().await;
        db.close().await;

        let err = service.initial_snapshot().await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Unavailable);
    }

    #[tokio::test]
    async fn test_quote_summary() {
        let (db, service) = setup().await;
        db.clients().create(&acme(30)).await.unwrap();

        let mut quote = q1();
        quote.items = vec![serde_json::from_value(json!({"qty": 2, "price": 50})).unwrap()];
        quote.payments = vec![serde_json::from_value(json!({"amount": 16})).unwrap()];
        db.quotes().save(&quote).await.unwrap();

        let summary = service.quote_summary("Q1").await.unwrap().unwrap();
        assert_eq!(summary.total.cents(), 11_600);
        assert_eq!(summary.balance.cents(), 10_000);
        assert_eq!(summary.payment_state, PaymentState::Partial);
        assert_eq!(
            summary.credit_due_date.map(|d| d.to_string()),
            Some("2024-01-31".to_string())
        );

        assert!(service.quote_summary("missing").await.unwrap().is_none());
    }
}
