//! HTTP server for the receipt processing API.
//!
//! Exposes upload, validation, processing, and receipt listing endpoints
//! under `/api/v1`, plus a service banner and health probe.

mod error;
mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::LlmClient;
use crate::ocr::TextExtractor;
use crate::repository::{DbContext, FileRepository, ReceiptRepository};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FileRepository>,
    pub receipts: Arc<ReceiptRepository>,
    pub extractor: TextExtractor,
    pub llm: Arc<LlmClient>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ctx = DbContext::from_url(&settings.database_url);
        ctx.init_schema().await?;

        Ok(Self {
            files: Arc::new(ctx.files()),
            receipts: Arc::new(ctx.receipts()),
            extractor: TextExtractor::new(),
            llm: Arc::new(LlmClient::new(settings.llm.clone())),
            upload_dir: settings.upload_dir.clone(),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
