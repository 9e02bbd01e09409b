//! Diesel database context for managing connections and repository access.
//!
//! Provides a unified entry point for database operations using Diesel ORM
//! over SQLite (via SyncConnectionWrapper).

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::diesel_job::DieselJobRepository;
use super::diesel_pool::{AsyncSqlitePool, DieselError};

/// Diesel database context that owns the connection factory and hands out repositories.
///
/// Create one context per command or service, then use it to access repositories.
///
/// # Example
/// ```ignore
/// let ctx = DieselDbContext::from_url("sqlite:jobs.db");
/// ctx.init_schema().await?;
/// let jobs = ctx.jobs().get_all().await?;
/// ```
#[derive(Clone, Debug)]
pub struct DieselDbContext {
    pool: AsyncSqlitePool,
}

impl DieselDbContext {
    /// Create a new database context from a file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Create a new database context from a `sqlite:` URL or plain path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Get the underlying connection factory.
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a job repository.
    pub fn jobs(&self) -> DieselJobRepository {
        DieselJobRepository::new(self.pool.clone())
    }

    /// Open a connection to verify the database is reachable.
    pub async fn test_connection(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute("SELECT 1").await
    }

    /// Initialize the database schema.
    ///
    /// `link` is unique so concurrent runs that both consider a posting new
    /// cannot store it twice.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS jobs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                link TEXT NOT NULL UNIQUE,
                image TEXT,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
            "#,
        )
        .await
    }
}
