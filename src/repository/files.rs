//! Repository for uploaded receipt files.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{NewReceiptFile, ReceiptFileRecord};
use super::pool::{AsyncSqlitePool, DieselError};
use super::{now_rfc3339, parse_datetime};
use crate::models::ReceiptFile;
use crate::schema::receipt_files;

impl From<ReceiptFileRecord> for ReceiptFile {
    fn from(record: ReceiptFileRecord) -> Self {
        ReceiptFile {
            id: record.id,
            file_name: record.file_name,
            file_path: record.file_path,
            is_valid: record.is_valid,
            invalid_reason: record.invalid_reason,
            is_processed: record.is_processed,
            created_at: parse_datetime(&record.created_at),
            updated_at: parse_datetime(&record.updated_at),
        }
    }
}

/// Repository for `receipt_files` rows.
#[derive(Clone)]
pub struct FileRepository {
    pool: AsyncSqlitePool,
}

impl FileRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Get a file by id.
    pub async fn get(&self, id: i32) -> Result<Option<ReceiptFile>, DieselError> {
        let mut conn = self.pool.get().await?;

        receipt_files::table
            .find(id)
            .first::<ReceiptFileRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(ReceiptFile::from))
    }

    /// Look up a file by its exact client-supplied name.
    pub async fn find_by_name(&self, file_name: &str) -> Result<Option<ReceiptFile>, DieselError> {
        let mut conn = self.pool.get().await?;

        receipt_files::table
            .filter(receipt_files::file_name.eq(file_name))
            .first::<ReceiptFileRecord>(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(ReceiptFile::from))
    }

    /// Insert a new, unvalidated, unprocessed file record.
    pub async fn create(
        &self,
        file_name: &str,
        file_path: &str,
    ) -> Result<ReceiptFile, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = now_rfc3339();

        diesel::insert_into(receipt_files::table)
            .values(&NewReceiptFile {
                file_name,
                file_path,
                is_valid: false,
                invalid_reason: None,
                is_processed: false,
                created_at: &now,
                updated_at: &now,
            })
            .execute(&mut conn)
            .await?;

        // file_name is unique, so this is the row just written
        receipt_files::table
            .filter(receipt_files::file_name.eq(file_name))
            .first::<ReceiptFileRecord>(&mut conn)
            .await
            .map(ReceiptFile::from)
    }

    /// Reset validation and processing state after the stored bytes were
    /// overwritten by a re-upload.
    pub async fn reset_for_reupload(&self, id: i32) -> Result<ReceiptFile, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = now_rfc3339();

        diesel::update(receipt_files::table.find(id))
            .set((
                receipt_files::is_valid.eq(false),
                receipt_files::invalid_reason.eq(None::<&str>),
                receipt_files::is_processed.eq(false),
                receipt_files::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;

        receipt_files::table
            .find(id)
            .first::<ReceiptFileRecord>(&mut conn)
            .await
            .map(ReceiptFile::from)
    }

    /// Record a validation outcome. Committed whether the PDF parsed or not.
    pub async fn set_validation(
        &self,
        id: i32,
        is_valid: bool,
        invalid_reason: Option<&str>,
    ) -> Result<ReceiptFile, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = now_rfc3339();

        diesel::update(receipt_files::table.find(id))
            .set((
                receipt_files::is_valid.eq(is_valid),
                receipt_files::invalid_reason.eq(invalid_reason),
                receipt_files::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;

        receipt_files::table
            .find(id)
            .first::<ReceiptFileRecord>(&mut conn)
            .await
            .map(ReceiptFile::from)
    }

    /// Mark a file as processed.
    pub async fn mark_processed(&self, id: i32) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let now = now_rfc3339();

        diesel::update(receipt_files::table.find(id))
            .set((
                receipt_files::is_processed.eq(true),
                receipt_files::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    async fn setup() -> (FileRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx.files(), dir)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, _dir) = setup().await;

        let file = repo.create("groceries.pdf", "uploads/groceries.pdf").await.unwrap();
        assert!(!file.is_valid);
        assert!(!file.is_processed);
        assert!(file.invalid_reason.is_none());

        let fetched = repo.get(file.id).await.unwrap().unwrap();
        assert_eq!(fetched.file_name, "groceries.pdf");
        assert_eq!(fetched.file_path, "uploads/groceries.pdf");

        assert!(repo.get(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let (repo, _dir) = setup().await;
        repo.create("a.pdf", "uploads/a.pdf").await.unwrap();

        assert!(repo.find_by_name("a.pdf").await.unwrap().is_some());
        assert!(repo.find_by_name("A.pdf").await.unwrap().is_none());
        assert!(repo.find_by_name("b.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validation_flags() {
        let (repo, _dir) = setup().await;
        let file = repo.create("r.pdf", "uploads/r.pdf").await.unwrap();

        let invalid = repo
            .set_validation(file.id, false, Some("not a PDF header"))
            .await
            .unwrap();
        assert!(!invalid.is_valid);
        assert_eq!(invalid.invalid_reason.as_deref(), Some("not a PDF header"));

        let valid = repo.set_validation(file.id, true, None).await.unwrap();
        assert!(valid.is_valid);
        assert!(valid.invalid_reason.is_none());
    }

    #[tokio::test]
    async fn test_reset_for_reupload_clears_state() {
        let (repo, _dir) = setup().await;
        let file = repo.create("r.pdf", "uploads/r.pdf").await.unwrap();

        repo.set_validation(file.id, true, None).await.unwrap();
        repo.mark_processed(file.id).await.unwrap();

        let reset = repo.reset_for_reupload(file.id).await.unwrap();
        assert!(!reset.is_valid);
        assert!(!reset.is_processed);
        assert!(reset.invalid_reason.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_by_constraint() {
        let (repo, _dir) = setup().await;
        repo.create("dup.pdf", "uploads/dup.pdf").await.unwrap();
        assert!(repo.create("dup.pdf", "uploads/dup.pdf").await.is_err());
    }
}
