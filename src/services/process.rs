//! Processing pipeline: OCR a validated file, extract fields, and store
//! the resulting receipt.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm::LlmClient;
use crate::models::Receipt;
use crate::ocr::{ExtractionError, TextExtractor};
use crate::repository::{DieselError, FileRepository, ReceiptRepository};

/// Errors from the processing pipeline.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Valid file not found")]
    NotFound,

    #[error(transparent)]
    Ocr(#[from] ExtractionError),

    #[error("Database error: {0}")]
    Db(#[from] DieselError),
}

/// Result of processing one file.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub receipt: Receipt,
    pub merchant_name: Option<String>,
    pub total_amount: Option<f64>,
    /// First 500 characters of the OCR output.
    pub raw_text: String,
}

/// Take the first `max` characters of `text`, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// OCR a validated file, run field extraction, and upsert its receipt.
///
/// Field extraction degrades silently: if the model call fails, the
/// receipt is stored with null fields and the file is still marked
/// processed. OCR failure, by contrast, aborts without touching either
/// record.
pub async fn process_file(
    files: &FileRepository,
    receipts: &ReceiptRepository,
    extractor: &TextExtractor,
    llm: &LlmClient,
    file_id: i32,
) -> Result<ProcessOutcome, ProcessError> {
    let file = files
        .get(file_id)
        .await?
        .filter(|f| f.is_valid)
        .ok_or(ProcessError::NotFound)?;

    // OCR shells out and blocks for seconds per page
    let path = PathBuf::from(&file.file_path);
    let worker = extractor.clone();
    let text = tokio::task::spawn_blocking(move || worker.extract_text(&path))
        .await
        .map_err(|e| ExtractionError::ExtractionFailed(e.to_string()))??;

    let fields = llm.extract_fields(&text).await;
    if let Some(reason) = &fields.error {
        warn!(file_id, %reason, "Field extraction degraded to null fields");
    }

    let receipt = receipts
        .upsert_by_path(
            &file.file_path,
            fields.merchant_name.as_deref(),
            fields.total_amount,
        )
        .await?;
    files.mark_processed(file_id).await?;

    info!(
        file_id,
        receipt_id = receipt.id,
        merchant = fields.merchant_name.as_deref().unwrap_or("<none>"),
        "Processed receipt file"
    );

    Ok(ProcessOutcome {
        merchant_name: receipt.merchant_name.clone(),
        total_amount: receipt.total_amount,
        receipt,
        raw_text: truncate_chars(&text, 500),
    })
}
