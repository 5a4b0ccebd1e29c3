//! Parse command - extract a receipt from a saved verification page.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use mev_core::parse_page;

use super::OutputFormat;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Saved HTML page
    #[arg(required = true)]
    input: PathBuf,

    /// Original receipt URL (defaults to a file:// URL of the input)
    #[arg(long)]
    url: Option<String>,

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

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let page = fs::read_to_string(&args.input)?;
    let url = args
        .url
        .unwrap_or_else(|| format!("file://{}", args.input.display()));
    let user_id = args.user.unwrap_or_else(Uuid::new_v4);

    let receipt = parse_page(&page, user_id, &url)
        .map_err(|e| anyhow::anyhow!("Unsupported or malformed document: {e}"))?;

    let rendered = super::render(&receipt, args.format)?;
    match &args.output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}
