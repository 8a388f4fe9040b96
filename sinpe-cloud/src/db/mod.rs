//! Database access layer
//!
//! SQLite connection pool, embedded migrations and per-table query modules.
//! Every mutating function writes its audit entry inside the same transaction
//! as the primary write.

pub mod audit;
pub mod cash_registers;
pub mod configurations;
pub mod employees;
pub mod merchants;
pub mod payments;
pub mod reports;
pub mod users;

use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// UNIQUE constraint violation, carries the offending `table.column` list
    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            // SQLite: "UNIQUE constraint failed: merchants.legal_id"
            if db_err.is_unique_violation() {
                let message = db_err.message();
                let columns = message
                    .rsplit_once(": ")
                    .map(|(_, cols)| cols)
                    .unwrap_or(message);
                return RepoError::Duplicate(columns.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::ForeignKey(db_err.message().to_string());
            }
        }
        RepoError::Database(err)
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Open the pool and apply pending migrations
pub async fn connect(database_url: &str) -> Result<SqlitePool, BoxError> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    // An in-memory database lives as long as its single connection
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    tracing::info!(in_memory, "Database connection established");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Open a transaction that holds the write lock from its first statement
///
/// A deferred transaction that reads first cannot upgrade its lock while
/// another writer is active, and fails with SQLITE_BUSY immediately.
pub async fn begin_write(pool: &SqlitePool) -> RepoResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Cheap liveness probe used by the health endpoint
pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
