//! Receiptor - receipt ingestion and processing service.
//!
//! Accepts scanned PDF receipts over HTTP, validates their structure,
//! extracts text with OCR, and derives merchant/amount/date fields with
//! a hosted language model.

mod cli;
mod config;
mod llm;
mod models;
mod ocr;
mod pdf;
mod repository;
mod schema;
mod server;
mod services;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (and legacy config.env) if present, before anything else
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_filename("config.env");

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "receiptor=info,tower_http=info"
    } else {
        "receiptor=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
