//! Regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// The Livewire attribute carrying the receipt payload. Only
    /// attributes whose value mentions the receipt index component
    /// qualify; other `wire:initial-data` attributes on the page do not.
    pub static ref RECEIPT_BLOB: Regex = Regex::new(
        r#"wire:initial-data="([^"]*receipt\.index-component[^"]*)""#
    ).unwrap();

    /// Quantity + unit token hidden in an item name, e.g. "1l", "250 g".
    ///
    /// The trailing letter capture stands in for a negative lookahead
    /// (unsupported by the regex crate): a candidate whose unit token is
    /// immediately followed by another letter is disqualified, and the
    /// scan moves on to the next candidate.
    pub static ref QUANTITY_UNIT: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)\s*(kg|g|ml|l)([a-z]?)"
    ).unwrap();
}
