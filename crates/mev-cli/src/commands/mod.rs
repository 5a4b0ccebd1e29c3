//! CLI subcommands.

pub mod parse;
pub mod process;

use clap::ValueEnum;
use console::style;
use mev_core::Receipt;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// Render a receipt in the chosen format.
pub fn render(receipt: &Receipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!(
                "{} {}\n",
                style("Merchant:").bold(),
                receipt.company_name
            ));
            out.push_str(&format!("{} {}\n", style("Address:").bold(), receipt.shop_address));
            out.push_str(&format!("{} {}\n", style("Date:").bold(), receipt.date));
            out.push_str(&format!(
                "{} {} {}\n",
                style("Total:").bold(),
                receipt.total_amount,
                receipt.currency_code.as_str()
            ));
            out.push_str(&format!(
                "{} {}\n",
                style("Items:").bold(),
                receipt.purchases.len()
            ));
            for item in &receipt.purchases {
                out.push_str(&format!(
                    "  {} x {} = {}\n",
                    item.quantity, item.name, item.price
                ));
            }
            Ok(out)
        }
    }
}
