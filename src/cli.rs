//! Command-line interface.

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::ocr::TextExtractor;
use crate::repository::DbContext;
use crate::server;

#[derive(Parser)]
#[command(name = "receiptor")]
#[command(about = "Receipt ingestion and processing service")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address as host:port (overrides HOST/PORT)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Create the database schema
    Init,

    /// Check that the external OCR tools are installed
    Tools,
}

/// Parse and run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Serve { bind } => {
            let (host, port) = match bind {
                Some(addr) => parse_bind(&addr)?,
                None => (settings.host.clone(), settings.port),
            };
            server::serve(&settings, &host, port).await
        }
        Commands::Init => {
            let ctx = DbContext::from_url(&settings.database_url);
            ctx.init_schema().await?;
            println!("Database initialized at {}", settings.database_url);
            Ok(())
        }
        Commands::Tools => {
            let mut all_ok = true;
            for (tool, available) in TextExtractor::check_tools() {
                let status = if available { "ok" } else { "MISSING" };
                println!("{:<12} {}", tool, status);
                all_ok &= available;
            }
            if !all_ok {
                anyhow::bail!("Some required tools are missing");
            }
            Ok(())
        }
    }
}

fn parse_bind(addr: &str) -> anyhow::Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("Bind address must be host:port, got '{}'", addr))?;
    let port: u16 = port
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid port in bind address '{}'", addr))?;
    Ok((host.to_string(), port))
}
