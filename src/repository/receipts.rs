//! Repository for parsed receipts.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewReceipt, ReceiptRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::{now_rfc3339, parse_datetime, parse_datetime_opt};
use crate::models::Receipt;
use crate::schema::receipts;

impl From<ReceiptRecord> for Receipt {
    fn from(record: ReceiptRecord) -> Self {
        Receipt {
            id: record.id,
            purchased_at: parse_datetime_opt(record.purchased_at),
            merchant_name: record.merchant_name,
            total_amount: record.total_amount,
            file_path: record.file_path,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Repository for `receipts` rows.
#[derive(Clone)]
pub struct ReceiptRepository {
    pool: AsyncSqlitePool,
}

impl ReceiptRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a receipt by id.
    pub async fn get(&self, id: i32) -> Result<Option<Receipt>, DieselError> {
        let mut conn = self.pool.get().await?;

        receipts::table
            .find(id)
            .first::<ReceiptRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Receipt::from))
    }

    /// Get all receipts in storage order.
    pub async fn get_all(&self) -> Result<Vec<Receipt>, DieselError> {
        let mut conn = self.pool.get().await?;

        receipts::table
            .load::<ReceiptRecord>(&mut conn)
            .await
            .map(|records| records.into_iter().map(Receipt::from).collect())
    }

    /// Look up a receipt by its source file path.
    pub async fn find_by_path(&self, file_path: &str) -> Result<Option<Receipt>, DieselError> {
        let mut conn = self.pool.get().await?;

        receipts::table
            .filter(receipts::file_path.eq(file_path))
            .first::<ReceiptRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Receipt::from))
    }

    /// Insert or update the receipt for a file path in a single statement.
    ///
    /// The UNIQUE constraint on `file_path` plus ON CONFLICT keeps this
    /// atomic: concurrent calls for the same path cannot produce duplicate
    /// rows or interleave a select-then-insert. `created_at` and `id` are
    /// preserved on update.
    pub async fn upsert_by_path(
        &self,
        file_path: &str,
        merchant_name: Option<&str>,
        total_amount: Option<f64>,
    ) -> Result<Receipt, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = now_rfc3339();

        diesel::insert_into(receipts::table)
            .values(&NewReceipt {
                file_path,
                merchant_name,
                total_amount,
                purchased_at: None,
                created_at: &now,
                updated_at: &now,
            })
            .on_conflict(receipts::file_path)
            .do_update()
            .set((
                receipts::merchant_name.eq(merchant_name),
                receipts::total_amount.eq(total_amount),
                receipts::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;

        receipts::table
            .filter(receipts::file_path.eq(file_path))
            .first::<ReceiptRecord>(&mut conn)
            .await
            .map(Receipt::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    async fn setup() -> (ReceiptRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx.receipts(), dir)
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let (repo, _dir) = setup().await;

        let first = repo
            .upsert_by_path("uploads/r.pdf", Some("Acme Mart"), Some(12.34))
            .await
            .unwrap();
        assert_eq!(first.merchant_name.as_deref(), Some("Acme Mart"));
        assert_eq!(first.total_amount, Some(12.34));
        assert!(first.purchased_at.is_none());

        let second = repo
            .upsert_by_path("uploads/r.pdf", Some("Acme Mart Inc"), Some(56.78))
            .await
            .unwrap();
        // Same row updated, not duplicated
        assert_eq!(second.id, first.id);
        assert_eq!(second.merchant_name.as_deref(), Some("Acme Mart Inc"));
        assert_eq!(second.total_amount, Some(56.78));

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_accepts_null_fields() {
        let (repo, _dir) = setup().await;

        let receipt = repo.upsert_by_path("uploads/n.pdf", None, None).await.unwrap();
        assert!(receipt.merchant_name.is_none());
        assert!(receipt.total_amount.is_none());
    }

    #[tokio::test]
    async fn test_get_and_find_by_path() {
        let (repo, _dir) = setup().await;

        let saved = repo
            .upsert_by_path("uploads/a.pdf", Some("Store"), Some(1.0))
            .await
            .unwrap();

        assert!(repo.get(saved.id).await.unwrap().is_some());
        assert!(repo.get(9999).await.unwrap().is_none());
        assert!(repo.find_by_path("uploads/a.pdf").await.unwrap().is_some());
        assert!(repo.find_by_path("uploads/other.pdf").await.unwrap().is_none());
    }
}
