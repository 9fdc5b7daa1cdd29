//! Domain models for uploaded files and parsed receipts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored metadata and processing state for one uploaded PDF.
///
/// Created on first upload of a given `file_name`; re-uploading the same
/// name overwrites the stored bytes and resets the validation/processing
/// flags. Records are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptFile {
    pub id: i32,
    /// Client-supplied file name, unique per record.
    pub file_name: String,
    /// Location of the stored bytes under the upload directory.
    pub file_path: String,
    /// Set only by the validator.
    pub is_valid: bool,
    /// Human-readable parse failure, present when validation failed.
    pub invalid_reason: Option<String>,
    /// Set after a successful extraction+parse cycle.
    pub is_processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured outcome derived from one processed file.
///
/// At most one receipt exists per distinct `file_path`; reprocessing the
/// same file updates the existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i32,
    /// Never populated: the model's date string is currently discarded.
    pub purchased_at: Option<DateTime<Utc>>,
    pub merchant_name: Option<String>,
    pub total_amount: Option<f64>,
    /// Path of the file this receipt was derived from (upsert key, not an
    /// enforced foreign key).
    pub file_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
