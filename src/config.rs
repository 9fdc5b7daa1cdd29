//! Environment-backed configuration.
//!
//! All knobs come from environment variables (optionally via `.env` or the
//! legacy `config.env`, loaded in `main`), with defaults that work for local
//! development.

use std::env;
use std::path::PathBuf;

use crate::llm::LlmConfig;

/// Application settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database location (path or `sqlite:` URL).
    pub database_url: String,
    /// Directory uploaded PDFs are written to.
    pub upload_dir: PathBuf,
    /// Bind host for the HTTP server.
    pub host: String,
    /// Bind port for the HTTP server.
    pub port: u16,
    /// Language-model client configuration.
    pub llm: LlmConfig,
}

impl Settings {
    /// Resolve settings from the environment.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "database/receipts.db".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            llm: LlmConfig::from_env(),
        }
    }
}
