//! HTTP handlers for the receipt API.

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::error::ApiError;
use super::AppState;
use crate::models::Receipt;
use crate::pdf;
use crate::services;

/// Body for validate and process requests.
#[derive(Debug, Deserialize)]
pub struct FileIdRequest {
    pub file_id: i32,
}

/// GET / service banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Receipt Processing API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /api/v1/upload receive a PDF as multipart form data.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidInput("Missing file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidInput(format!("Failed to read upload: {}", e)))?;
        upload = Some((name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::InvalidInput("No file field in request".to_string()))?;

    let outcome =
        services::store_upload(&state.files, &state.upload_dir, &file_name, &bytes).await?;

    let message = if outcome.created {
        "File uploaded successfully"
    } else {
        "File updated successfully"
    };

    Ok(Json(json!({
        "file_id": outcome.file.id,
        "file_name": outcome.file.file_name,
        "message": message,
    })))
}

/// POST /api/v1/validate check PDF structure for an uploaded file.
pub async fn validate(
    State(state): State<AppState>,
    Json(req): Json<FileIdRequest>,
) -> Result<Json<Value>, ApiError> {
    let file = state
        .files
        .get(req.file_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let verdict = pdf::validate_structure(FsPath::new(&file.file_path));
    let (is_valid, reason) = match &verdict {
        Ok(()) => (true, None),
        Err(reason) => (false, Some(reason.as_str())),
    };

    let file = state.files.set_validation(file.id, is_valid, reason).await?;
    info!(file_id = file.id, is_valid, "Validated receipt file");

    Ok(Json(json!({
        "file_id": file.id,
        "is_valid": file.is_valid,
        "invalid_reason": file.invalid_reason,
    })))
}

/// POST /api/v1/process OCR a validated file and extract receipt fields.
pub async fn process(
    State(state): State<AppState>,
    Json(req): Json<FileIdRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = services::process_file(
        &state.files,
        &state.receipts,
        &state.extractor,
        &state.llm,
        req.file_id,
    )
    .await?;

    Ok(Json(json!({
        "receipt_id": outcome.receipt.id,
        "merchant_name": outcome.merchant_name,
        "total_amount": outcome.total_amount,
        "raw_text": outcome.raw_text,
    })))
}

/// GET /api/v1/receipts list every stored receipt.
pub async fn list_receipts(State(state): State<AppState>) -> Result<Json<Vec<Receipt>>, ApiError> {
    let receipts = state.receipts.get_all().await?;
    Ok(Json(receipts))
}

/// GET /api/v1/receipts/:id fetch one receipt.
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Receipt>, ApiError> {
    let receipt = state
        .receipts
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Receipt not found".to_string()))?;
    Ok(Json(receipt))
}
