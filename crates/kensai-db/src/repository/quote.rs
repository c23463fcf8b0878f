//! # Quote Repository
//!
//! Persists a quote together with the items and payments it owns.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Whole-Graph Save                                  │
//! │                                                                         │
//! │  validate_quote()            ── reject before touching the database    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE             ── take the write lock before any read    │
//! │   ├── client exists?         ── no: ForeignKeyViolation, roll back     │
//! │   ├── upsert quotes row      ── INSERT ... ON CONFLICT(id) DO UPDATE   │
//! │   ├── DELETE quote_items     ── old children go away                   │
//! │   ├── DELETE quote_payments                                            │
//! │   ├── INSERT items           ── one row per item, in request order     │
//! │   └── INSERT payments                                                  │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any failure before COMMIT drops the transaction: nothing is visible.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reading
//! Listing runs three queries (headers, items, payments) and stitches the
//! children onto their quotes in memory; the query count does not grow with
//! the number of quotes.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{FromRow, SqliteConnection};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use kensai_core::validation::validate_quote;
use kensai_core::{Fields, Payment, Quote, QuoteItem, WriteAck};

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    db: Database,
}

/// Raw `quotes` row, without children.
#[derive(Debug, FromRow)]
struct QuoteRow {
    id: String,
    quote_number: String,
    date: String,
    client_id: String,
    status: String,
    payment_condition: String,
    tax_rate: f64,
    expires: Option<String>,
    company: Option<String>,
    notes: Option<String>,
    salesperson_id: Option<String>,
    acceptance_date: Option<String>,
}

impl QuoteRow {
    fn into_quote(self, items: Vec<QuoteItem>, payments: Vec<Payment>) -> DbResult<Quote> {
        Ok(Quote {
            id: self.id,
            quote_number: self.quote_number,
            date: self.date,
            client_id: self.client_id,
            status: self.status,
            payment_condition: self.payment_condition,
            tax_rate: self.tax_rate,
            items,
            payments,
            expires: self.expires,
            company: self.company.as_deref().map(decode).transpose()?,
            notes: self.notes,
            salesperson_id: self.salesperson_id,
            acceptance_date: self.acceptance_date,
        })
    }
}

const SELECT_QUOTES: &str = r#"
    SELECT id, quote_number, date, client_id, status, payment_condition, tax_rate,
           expires, company, notes, salesperson_id, acceptance_date
    FROM quotes
"#;

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    pub fn new(db: Database) -> Self {
        QuoteRepository { db }
    }

    /// Creates or fully replaces a quote and everything it owns.
    ///
    /// After a successful save, the stored items and payments are exactly
    /// the ones in `quote`, in the same order.
    ///
    /// ## Errors
    /// * `DbError::Validation` - header failed validation, nothing written
    /// * `DbError::ForeignKeyViolation` - `clientId` is not a stored client
    /// * `DbError::Unavailable` - no connection could be obtained
    pub async fn save(&self, quote: &Quote) -> DbResult<WriteAck> {
        validate_quote(quote)?;

        // Encode up front so a bad value fails before BEGIN.
        let items = encode_all(quote.items.iter().map(QuoteItem::fields))?;
        let payments = encode_all(quote.payments.iter().map(Payment::fields))?;
        let company = quote.company.as_ref().map(serde_json::to_string).transpose()?;

        debug!(
            id = %quote.id,
            client_id = %quote.client_id,
            items = items.len(),
            payments = payments.len(),
            "Saving quote"
        );

        let mut tx = self.db.begin_write().await?;

        let client_exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM clients WHERE id = ?1")
                .bind(&quote.client_id)
                .fetch_optional(&mut *tx)
                .await?;
        if client_exists.is_none() {
            return Err(DbError::dangling(format!(
                "client '{}' does not exist",
                quote.client_id
            )));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, quote_number, date, client_id, status,
                payment_condition, tax_rate, expires, company, notes,
                salesperson_id, acceptance_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            ON CONFLICT(id) DO UPDATE SET
                quote_number      = excluded.quote_number,
                date              = excluded.date,
                client_id         = excluded.client_id,
                status            = excluded.status,
                payment_condition = excluded.payment_condition,
                tax_rate          = excluded.tax_rate,
                expires           = excluded.expires,
                company           = excluded.company,
                notes             = excluded.notes,
                salesperson_id    = excluded.salesperson_id,
                acceptance_date   = excluded.acceptance_date,
                updated_at        = excluded.updated_at
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.quote_number)
        .bind(&quote.date)
        .bind(&quote.client_id)
        .bind(&quote.status)
        .bind(&quote.payment_condition)
        .bind(quote.tax_rate)
        .bind(&quote.expires)
        .bind(&company)
        .bind(&quote.notes)
        .bind(&quote.salesperson_id)
        .bind(&quote.acceptance_date)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
            .bind(&quote.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM quote_payments WHERE quote_id = ?1")
            .bind(&quote.id)
            .execute(&mut *tx)
            .await?;

        for (position, data) in items.iter().enumerate() {
            sqlx::query("INSERT INTO quote_items (quote_id, position, data) VALUES (?1, ?2, ?3)")
                .bind(&quote.id)
                .bind(position as i64)
                .bind(data)
                .execute(&mut *tx)
                .await?;
        }
        for (position, data) in payments.iter().enumerate() {
            sqlx::query(
                "INSERT INTO quote_payments (quote_id, position, data) VALUES (?1, ?2, ?3)",
            )
            .bind(&quote.id)
            .bind(position as i64)
            .bind(data)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %quote.id, "Quote saved");
        Ok(WriteAck::saved(quote.id.as_str()))
    }

    /// Lists every stored quote with its items and payments.
    pub async fn list(&self) -> DbResult<Vec<Quote>> {
        let mut conn = self.db.acquire().await?;
        fetch_all(&mut conn).await
    }

    /// Gets one quote with its items and payments.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quote>> {
        let mut conn = self.db.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Counts stored quotes.
    pub async fn count(&self) -> DbResult<i64> {
        let mut conn = self.db.acquire().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }
}

/// Reads every quote, with children, on an already-acquired connection.
///
/// Quotes come back in first-saved order; re-saving a quote keeps its place.
pub async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Quote>> {
    let rows: Vec<QuoteRow> = sqlx::query_as(&format!("{SELECT_QUOTES} ORDER BY rowid"))
        .fetch_all(&mut *conn)
        .await?;

    let mut items = fetch_children(
        conn,
        "SELECT quote_id, data FROM quote_items ORDER BY quote_id, position",
    )
    .await?;
    let mut payments = fetch_children(
        conn,
        "SELECT quote_id, data FROM quote_payments ORDER BY quote_id, position",
    )
    .await?;

    debug!(count = rows.len(), "Loaded quotes");

    rows.into_iter()
        .map(|row| {
            let quote_items = items
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(QuoteItem::from)
                .collect();
            let quote_payments = payments
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(Payment::from)
                .collect();
            row.into_quote(quote_items, quote_payments)
        })
        .collect()
}

/// Reads one quote, with children, on an already-acquired connection.
pub async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Quote>> {
    let row: Option<QuoteRow> = sqlx::query_as(&format!("{SELECT_QUOTES} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let items = fetch_children_of(
        conn,
        "SELECT data FROM quote_items WHERE quote_id = ?1 ORDER BY position",
        id,
    )
    .await?;
    let payments = fetch_children_of(
        conn,
        "SELECT data FROM quote_payments WHERE quote_id = ?1 ORDER BY position",
        id,
    )
    .await?;

    row.into_quote(
        items.into_iter().map(QuoteItem::from).collect(),
        payments.into_iter().map(Payment::from).collect(),
    )
    .map(Some)
}

// =============================================================================
// Child Rows
// =============================================================================

fn encode_all<'a>(fields: impl Iterator<Item = &'a Fields>) -> DbResult<Vec<String>> {
    fields
        .map(|f| serde_json::to_string(f).map_err(DbError::from))
        .collect()
}

fn decode(data: &str) -> DbResult<Fields> {
    Ok(serde_json::from_str(data)?)
}

/// Loads `(quote_id, data)` rows, grouped by quote in position order.
async fn fetch_children(
    conn: &mut SqliteConnection,
    sql: &'static str,
) -> DbResult<HashMap<String, Vec<Fields>>> {
    let rows: Vec<(String, String)> = sqlx::query_as(sql).fetch_all(&mut *conn).await?;

    let mut grouped: HashMap<String, Vec<Fields>> = HashMap::new();
    for (quote_id, data) in rows {
        grouped.entry(quote_id).or_default().push(decode(&data)?);
    }
    Ok(grouped)
}

async fn fetch_children_of(
    conn: &mut SqliteConnection,
    sql: &'static str,
    quote_id: &str,
) -> DbResult<Vec<Fields>> {
    let rows: Vec<String> = sqlx::query_scalar(sql)
        .bind(quote_id)
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(|data| decode(data)).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::DbConfig;
    use kensai_core::{Client, WriteStatus};
    use serde_json::json;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.clients().create(&client("C1")).await.unwrap();
        db
    }

    fn client(id: &str) -> Client {
        Client {
            id: id.to_string(),
            name: "Acme".to_string(),
            email: "a@acme.com".to_string(),
            phone: String::new(),
            address: String::new(),
            credit_status: "good".to_string(),
            credit_days: 0,
        }
    }

    fn quote(value: serde_json::Value) -> Quote {
        serde_json::from_value(value).unwrap()
    }

    fn q1() -> Quote {
        quote(json!({
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
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let db = setup().await;

        let ack = db.quotes().save(&q1()).await.unwrap();
        assert_eq!(ack.status, WriteStatus::Saved);
        assert_eq!(ack.id, "Q1");

        let quotes = db.quotes().list().await.unwrap();
        assert_eq!(quotes, vec![q1()]);
    }

    #[tokio::test]
    async fn test_open_fields_round_trip_in_order() {
        let db = setup().await;

        let mut q = q1();
        q.items = vec![
            quote_item(json!({"zeta": 1, "alpha": {"nested": [1, 2]}, "mid": null})),
            quote_item(json!({"description": "Instalación", "price": "12.50"})),
        ];
        q.payments = vec![Payment::from(
            json!({"id": "P1", "amount": 50, "method": "Efectivo", "date": "2024-01-02"})
                .as_object()
                .unwrap()
                .clone(),
        )];
        db.quotes().save(&q).await.unwrap();

        let stored = db.quotes().get_by_id("Q1").await.unwrap().unwrap();
        assert_eq!(stored, q);

        let keys: Vec<&String> = stored.items[0].fields().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    fn quote_item(value: serde_json::Value) -> QuoteItem {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_resave_replaces_children() {
        let db = setup().await;
        db.quotes().save(&q1()).await.unwrap();

        let mut updated = q1();
        updated.status = "sent".to_string();
        updated.items = vec![
            quote_item(json!({"desc": "Gadget", "qty": 1})),
            quote_item(json!({"desc": "Bolt", "qty": 10})),
        ];
        db.quotes().save(&updated).await.unwrap();

        let quotes = db.quotes().list().await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0], updated);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let db = setup().await;
        db.quotes().save(&q1()).await.unwrap();
        db.quotes().save(&q1()).await.unwrap();

        assert_eq!(db.quotes().list().await.unwrap(), vec![q1()]);
    }

    #[tokio::test]
    async fn test_unknown_client_persists_nothing() {
        let db = setup().await;

        let mut q = q1();
        q.client_id = "C9".to_string();
        let err = db.quotes().save(&q).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::ReferentialIntegrity);

        assert_eq!(db.quotes().count().await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn test_failed_resave_keeps_previous_graph() {
        let db = setup().await;
        db.quotes().save(&q1()).await.unwrap();

        let mut moved = q1();
        moved.client_id = "C9".to_string();
        moved.items = vec![];
        assert!(db.quotes().save(&moved).await.is_err());

        let stored = db.quotes().get_by_id("Q1").await.unwrap().unwrap();
        assert_eq!(stored, q1());
    }

    #[tokio::test]
    async fn test_invalid_quote_rejected_before_write() {
        let db = setup().await;

        let mut q = q1();
        q.date = "someday".to_string();
        let err = db.quotes().save(&q).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Validation);
        assert_eq!(db.quotes().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_groups_children_per_quote() {
        let db = setup().await;
        db.clients().create(&client("C2")).await.unwrap();

        let mut a = q1();
        a.items = vec![
            quote_item(json!({"n": 1})),
            quote_item(json!({"n": 2})),
            quote_item(json!({"n": 3})),
        ];
        let mut b = q1();
        b.id = "Q0".to_string();
        b.client_id = "C2".to_string();
        b.items = vec![];
        b.payments = vec![Payment::from(
            json!({"amount": 10}).as_object().unwrap().clone(),
        )];

        db.quotes().save(&a).await.unwrap();
        db.quotes().save(&b).await.unwrap();

        let quotes = db.quotes().list().await.unwrap();
        assert_eq!(quotes, vec![a, b]);
    }

    #[tokio::test]
    async fn test_deleting_quote_cascades() {
        let db = setup().await;
        db.quotes().save(&q1()).await.unwrap();

        sqlx::query("DELETE FROM quotes WHERE id = 'Q1'")
            .execute(db.pool())
            .await
            .unwrap();

        let orphans: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM quote_items) + (SELECT COUNT(*) FROM quote_payments)",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_quote_details_round_trip() {
        let db = setup().await;

        let mut q = q1();
        q.expires = Some("2024-01-31".to_string());
        q.company = Some(
            json!({"name": "Kensai Impresos", "phone": "55 1234 5678"})
                .as_object()
                .unwrap()
                .clone(),
        );
        q.notes = Some("Entrega en sitio".to_string());
        q.salesperson_id = Some("S1".to_string());
        q.acceptance_date = Some("2024-01-05".to_string());
        db.quotes().save(&q).await.unwrap();

        assert_eq!(db.quotes().get_by_id("Q1").await.unwrap().unwrap(), q);
        assert_eq!(db.quotes().list().await.unwrap(), vec![q]);

        // Re-saving without details clears them.
        db.quotes().save(&q1()).await.unwrap();
        assert_eq!(db.quotes().get_by_id("Q1").await.unwrap().unwrap(), q1());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_of_different_quotes() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("kensai.db")).max_connections(8))
            .await
            .unwrap();
        db.clients().create(&client("C1")).await.unwrap();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let db = db.clone();
                let mut q = q1();
                q.id = format!("Q{i}");
                tokio::spawn(async move { db.quotes().save(&q).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(db.quotes().count().await.unwrap(), 64);

        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 64);
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let db = setup().await;
        db.close().await;

        let err = db.quotes().save(&q1()).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Unavailable);
        let err = db.quotes().list().await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Unavailable);
    }
}
