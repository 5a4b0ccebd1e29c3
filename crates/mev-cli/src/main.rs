//! CLI application for Moldovan fiscal e-receipt extraction.

mod commands;
mod fetch;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{parse, process};

/// Moldovan fiscal e-receipts - extract structured data from the
/// verification portal
#[derive(Parser)]
#[command(name = "mev")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the JSON store file
    #[arg(short, long, global = true, default_value = "mev-receipts.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, parse and persist a receipt by its verification URL
    Process(process::ProcessArgs),

    /// Parse a saved verification page offline
    Parse(parse::ParseArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Process(args) => process::run(args, &cli.store).await,
        Commands::Parse(args) => parse::run(args).await,
    }
}
