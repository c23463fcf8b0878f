//! # Client Repository
//!
//! Insert-only store for clients.
//!
//! Clients are created once and never updated through this API. A second
//! create with the same id is rejected and the stored row is left alone.

use chrono::Utc;
use sqlx::{FromRow, SqliteConnection};
use tracing::debug;

use crate::error::{DbError, DbResult, ErrorClass};
use crate::pool::Database;
use kensai_core::validation::validate_client;
use kensai_core::{Client, WriteAck};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: Database,
}

/// Raw `clients` row.
#[derive(Debug, FromRow)]
struct ClientRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    address: String,
    credit_status: String,
    credit_days: i64,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            credit_status: row.credit_status,
            credit_days: row.credit_days,
        }
    }
}

const SELECT_CLIENTS: &str = r#"
    SELECT id, name, email, phone, address, credit_status, credit_days
    FROM clients
"#;

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(db: Database) -> Self {
        ClientRepository { db }
    }

    /// Inserts a new client.
    ///
    /// ## Errors
    /// * `DbError::Validation` - a field failed validation, nothing written
    /// * `DbError::UniqueViolation` - the id is already taken
    /// * `DbError::Unavailable` - no connection could be obtained
    pub async fn create(&self, client: &Client) -> DbResult<WriteAck> {
        validate_client(client)?;

        debug!(id = %client.id, name = %client.name, "Creating client");

        let mut conn = self.db.acquire().await?;

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, email, phone, address,
                credit_status, credit_days, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.credit_status)
        .bind(client.credit_days)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.class() == ErrorClass::Duplicate => {
                DbError::duplicate("client id", client.id.as_str())
            }
            err => err,
        })?;

        Ok(WriteAck::success(client.id.as_str()))
    }

    /// Lists every stored client, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let mut conn = self.db.acquire().await?;
        fetch_all(&mut conn).await
    }

    /// Gets a client by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let mut conn = self.db.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Counts stored clients.
    pub async fn count(&self) -> DbResult<i64> {
        let mut conn = self.db.acquire().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }
}

/// Reads every client on an already-acquired connection.
///
/// Lets a caller read clients and quotes from the same transaction.
pub async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Client>> {
    let rows: Vec<ClientRow> = sqlx::query_as(&format!("{SELECT_CLIENTS} ORDER BY rowid"))
        .fetch_all(&mut *conn)
        .await?;

    debug!(count = rows.len(), "Loaded clients");
    Ok(rows.into_iter().map(Client::from).collect())
}

/// Reads one client on an already-acquired connection.
pub async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Client>> {
    let row: Option<ClientRow> = sqlx::query_as(&format!("{SELECT_CLIENTS} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Client::from))
}

// =============================================================================
// Unit Tests
// =============================================================================
