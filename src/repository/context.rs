//! Database context for managing connections and repository access.
//!
//! Provides a unified entry point for database operations. Create one
//! context per command or service, then use it to access repositories.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::files::FileRepository;
use super::pool::{AsyncSqlitePool, DieselError};
use super::receipts::ReceiptRepository;

/// Database context that owns the connection pool and hands out repositories.
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a context from a database URL or bare file path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Create a context from a file path.
    pub fn from_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Get the underlying pool.
    #[allow(dead_code)]
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a file repository.
    pub fn files(&self) -> FileRepository {
        FileRepository::new(self.pool.clone())
    }

    /// Get a receipt repository.
    pub fn receipts(&self) -> ReceiptRepository {
        ReceiptRepository::new(self.pool.clone())
    }

    /// Initialize the database schema.
    ///
    /// Creates the tables if they don't exist. Uniqueness of
    /// `receipt_files.file_name` and `receipts.file_path` is enforced here
    /// so upserts keyed on them cannot produce duplicates.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(
            r#"
            -- Uploaded PDF files and their validation/processing state
            CREATE TABLE IF NOT EXISTS receipt_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL UNIQUE,
                file_path TEXT NOT NULL,
                is_valid INTEGER NOT NULL DEFAULT 0,
                invalid_reason TEXT,
                is_processed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Structured fields parsed from processed files
            CREATE TABLE IF NOT EXISTS receipts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL UNIQUE,
                merchant_name TEXT,
                total_amount REAL,
                purchased_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_receipt_files_name ON receipt_files(file_name);
            CREATE INDEX IF NOT EXISTS idx_receipts_path ON receipts(file_path);
            "#,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel_async::RunQueryDsl;
    use tempfile::tempdir;

    #[derive(diesel::QueryableByName)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    #[tokio::test]
    async fn test_init_schema_creates_tables() {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));

        ctx.init_schema().await.unwrap();
        // Idempotent
        ctx.init_schema().await.unwrap();

        let mut conn = ctx.pool().get().await.unwrap();
        let rows: Vec<TableName> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .load(&mut conn)
        .await
        .unwrap();

        let names: Vec<String> = rows.into_iter().map(|r| r.name).collect();
        assert!(names.contains(&"receipt_files".to_string()));
        assert!(names.contains(&"receipts".to_string()));
    }
}
