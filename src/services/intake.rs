//! Receipt upload intake: filename checks, disk writes, and record
//! creation or reset on re-upload.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::ReceiptFile;
use crate::repository::{DieselError, FileRepository};

/// Errors from upload intake.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Only PDF files are allowed")]
    NotPdf,

    #[error("Unsafe file name: {0}")]
    UnsafeName(String),

    #[error("Database error: {0}")]
    Db(#[from] DieselError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of storing one upload.
#[derive(Debug)]
pub struct IntakeOutcome {
    pub file: ReceiptFile,
    /// False when an existing record with the same name was overwritten.
    pub created: bool,
}

/// Sanitize a client-supplied filename for use as a path component.
///
/// Path separators, shell-hostile punctuation, and control characters
/// become underscores, leading and trailing underscores are trimmed, and
/// the result is capped at 100 characters.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim_matches('_');
    let mut result: String = trimmed.chars().take(100).collect();
    if result.is_empty() {
        result = "unnamed".to_string();
    }
    result
}

/// True when `path` stays inside `root` without resolving symlinks.
fn is_contained(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
        && !path
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
}

/// Store an uploaded PDF and create or reset its tracking record.
///
/// The PDF check runs against the client's original name; only the
/// sanitized form ever touches the filesystem. A re-upload under an
/// existing name overwrites the stored bytes and resets the record's
/// validation and processing flags, while any receipt previously parsed
/// from the old bytes stays untouched until the file is processed again.
pub async fn store_upload(
    files: &FileRepository,
    upload_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<IntakeOutcome, IntakeError> {
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(IntakeError::NotPdf);
    }

    let safe_name = sanitize_filename(file_name);
    std::fs::create_dir_all(upload_dir)?;

    if let Some(existing) = files.find_by_name(file_name).await? {
        let stored_path = PathBuf::from(&existing.file_path);
        if !is_contained(&stored_path, upload_dir) {
            warn!(path = %existing.file_path, "Stored path escapes upload directory");
            return Err(IntakeError::UnsafeName(existing.file_path));
        }

        std::fs::write(&stored_path, bytes)?;
        let file = files.reset_for_reupload(existing.id).await?;
        info!(id = file.id, name = %file.file_name, "Re-uploaded existing receipt file");
        return Ok(IntakeOutcome { file, created: false });
    }

    let dest = upload_dir.join(&safe_name);
    std::fs::write(&dest, bytes)?;

    let file = files
        .create(file_name, &dest.to_string_lossy())
        .await?;
    info!(id = file.id, name = %file.file_name, "Stored new receipt file");

    Ok(IntakeOutcome { file, created: true })
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

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("receipt.pdf"), "receipt.pdf");
        assert_eq!(sanitize_filename("a/b\\c.pdf"), "a_b_c.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd.pdf"), ".._.._etc_passwd.pdf");
        assert_eq!(sanitize_filename("///"), "unnamed");
        assert!(sanitize_filename(&"x".repeat(300)).chars().count() <= 100);
    }

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let (files, dir) = setup().await;
        let uploads = dir.path().join("uploads");

        let err = store_upload(&files, &uploads, "notes.txt", b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NotPdf));
    }

    #[tokio::test]
    async fn test_stores_new_file() {
        let (files, dir) = setup().await;
        let uploads = dir.path().join("uploads");

        let outcome = store_upload(&files, &uploads, "groceries.pdf", b"%PDF-1.5")
            .await
            .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.file.file_name, "groceries.pdf");
        assert!(!outcome.file.is_valid);
        assert!(!outcome.file.is_processed);
        assert_eq!(std::fs::read(&outcome.file.file_path).unwrap(), b"%PDF-1.5");
    }

    #[tokio::test]
    async fn test_traversal_name_stays_in_upload_dir() {
        let (files, dir) = setup().await;
        let uploads = dir.path().join("uploads");

        let outcome = store_upload(&files, &uploads, "../escape.pdf", b"%PDF-1.5")
            .await
            .unwrap();
        let stored = PathBuf::from(&outcome.file.file_path);
        assert!(stored.starts_with(&uploads));
        assert!(stored.exists());
    }

    #[tokio::test]
    async fn test_reupload_resets_flags_and_keeps_id() {
        let (files, dir) = setup().await;
        let uploads = dir.path().join("uploads");

        let first = store_upload(&files, &uploads, "r.pdf", b"old bytes")
            .await
            .unwrap();
        files
            .set_validation(first.file.id, true, None)
            .await
            .unwrap();
        files.mark_processed(first.file.id).await.unwrap();

        let second = store_upload(&files, &uploads, "r.pdf", b"new bytes")
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.file.id, first.file.id);
        assert!(!second.file.is_valid);
        assert!(!second.file.is_processed);
        assert!(second.file.invalid_reason.is_none());
        assert_eq!(std::fs::read(&second.file.file_path).unwrap(), b"new bytes");
    }
}
