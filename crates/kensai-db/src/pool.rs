//! # Database Pool Management
//!
//! Connection pool creation and the scoped-connection gateway every store
//! goes through.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Server startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Explicit config, no globals                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ acquire() / begin()  one scoped connection per store call      │
//! │       ▼                                                                 │
//! │  POST /api/quotes ──► QuoteRepository::save ──► Conn1 ──► returned     │
//! │  GET  /api/init   ──► SyncService::snapshot  ──► Conn2 ──► returned    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Release Guarantee
//! Connections come back as RAII guards. Dropping a `PoolConnection`
//! returns it to the pool; dropping an uncommitted `Transaction` rolls it
//! back first. Every exit path, including `?` early returns, releases.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::client::ClientRepository;
use crate::repository::quote::QuoteRepository;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// Passed explicitly to [`Database::new`], so tests can run any number of
/// isolated databases side by side.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/kensai/kensai.db")
///     .max_connections(10)
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Upper bound on waiting for a connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps them forever.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquisition timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Each pool built from this config gets its own private database.
    /// The single connection is never recycled, since closing it would
    /// discard the data.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// Whether this config points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::Unavailable(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                // WAL: readers don't block the writer during a quote save
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        // Quote → client references and item/payment cascades rely on this.
        // Writers queue behind each other for up to the acquire timeout.
        Ok(options
            .foreign_keys(true)
            .busy_timeout(self.connect_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Database handle: the connection gateway and repository factory.
///
/// Cloning is cheap (the pool is reference counted).
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("kensai.db")).await?;
/// db.clients().create(&client).await?;
/// let quotes = db.quotes().list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates the connection pool and, if enabled, runs migrations.
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError::Unavailable)` - The database could not be opened
    /// * `Err(DbError::MigrationFailed)` - Schema could not be applied
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    // =========================================================================
    // Connection Gateway
    // =========================================================================

    /// Acquires a scoped connection.
    ///
    /// Any failure to hand out a connection (timeout, closed pool, file that
    /// can't be opened) is reported as [`DbError::Unavailable`]. The
    /// connection returns to the pool when the guard is dropped.
    pub async fn acquire(&self) -> DbResult<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(|e| {
            warn!(error = %e, "Failed to acquire database connection");
            DbError::Unavailable(e.to_string())
        })
    }

    /// Acquires a scoped connection and opens a transaction on it.
    ///
    /// Dropping the transaction without `commit()` rolls it back and
    /// releases the connection.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to open database transaction");
            DbError::Unavailable(e.to_string())
        })
    }

    /// Opens a write transaction with `BEGIN IMMEDIATE`.
    ///
    /// The write lock is taken up front, so a concurrent writer makes this
    /// wait (bounded by the busy timeout) instead of failing a later
    /// read-to-write upgrade with `SQLITE_BUSY`. A lock still held when
    /// the wait runs out is reported as [`DbError::Unavailable`].
    pub async fn begin_write(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(|e| {
            warn!(error = %e, "Failed to open write transaction");
            DbError::Unavailable(e.to_string())
        })
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer repository methods; this exists for diagnostics and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Repositories
    // =========================================================================

    /// Returns the client store.
    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.clone())
    }

    /// Returns the quote store.
    pub fn quotes(&self) -> QuoteRepository {
        QuoteRepository::new(self.clone())
    }

    /// Closes the pool. Subsequent operations fail with `Unavailable`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query(
            "INSERT INTO clients (id, name, email, credit_status, created_at)
             VALUES ('C1', 'Acme', 'a@acme.com', 'good', '2024-01-01T00:00:00Z')",
        )
        .execute(a.pool())
        .await
        .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(b.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_acquire_after_close_is_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.acquire().await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)));
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_connection_released_on_drop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Single-connection pool: a leaked guard would make the second
        // acquire time out.
        {
            let _conn = db.acquire().await.unwrap();
        }
        {
            let _tx = db.begin().await.unwrap();
        }
        {
            let _tx = db.begin_write().await.unwrap();
        }
        assert!(db.acquire().await.is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/kensai-test.db")
            .max_connections(10)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(3))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
