//! Process command - fetch, parse and persist a receipt by URL.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;
use uuid::Uuid;

use mev_core::{ProcessError, ReceiptProcessor};

use crate::fetch::HttpFetcher;
use crate::store::JsonFileStore;

use super::OutputFormat;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Receipt verification URL
    #[arg(required = true)]
    url: String,

    /// User id to attach to the receipt (random when omitted)
    #[arg(short, long)]
    user: Option<Uuid>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: ProcessArgs, store_path: &Path) -> anyhow::Result<()> {
    let user_id = args.user.unwrap_or_else(Uuid::new_v4);
    let store = JsonFileStore::open(store_path)?;
    let processor = ReceiptProcessor::new(HttpFetcher::new()?, store);

    info!("Processing receipt URL: {}", args.url);

    let receipt = match processor.process_url(&args.url, user_id).await {
        Ok(receipt) => receipt,
        Err(ProcessError::UnsupportedUrl(url)) => {
            anyhow::bail!("Unsupported URL (not a known verification portal): {url}")
        }
        Err(ProcessError::FetchFailed) => {
            anyhow::bail!("Could not retrieve the document at {}", args.url)
        }
        Err(ProcessError::Parse(e)) => {
            anyhow::bail!("Unsupported or malformed document: {e}")
        }
        Err(ProcessError::Store(e)) => {
            anyhow::bail!("Failed to persist receipt: {e}")
        }
    };

    let rendered = super::render(&receipt, args.format)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }

    eprintln!(
        "{} receipt {} ({} items) stored in {}",
        style("OK").green().bold(),
        receipt.id,
        receipt.purchases.len(),
        store_path.display()
    );
    Ok(())
}
