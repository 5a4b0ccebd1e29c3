//! Lookup records mapping receipt URLs to stored receipts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::receipt::CountryCode;

/// Stable lookup key for a receipt URL.
pub fn url_hash(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Secondary-index record: a URL form pointing at a stored receipt.
///
/// A receipt gets one record per URL form (original and canonical), so a
/// later lookup by either form short-circuits without a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptUrl {
    /// Hash of `url`; primary key of the record.
    pub id: String,
    pub url: String,
    pub receipt_id: String,
    #[serde(default)]
    pub country_code: CountryCode,
}

impl ReceiptUrl {
    pub fn new(url: impl Into<String>, receipt_id: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: url_hash(&url),
            url,
            receipt_id: receipt_id.into(),
            country_code: CountryCode::Moldova,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_hash_is_stable() {
        let url = "https://mev.sfs.md/receipt-verifier/J403001576/118.04/135932/2024-01-17";
        assert_eq!(url_hash(url), url_hash(url));
        assert_ne!(url_hash(url), url_hash("https://mev.sfs.md/other"));
        // sha256 hex
        assert_eq!(url_hash(url).len(), 64);
    }

    #[test]
    fn test_record_id_matches_url_hash() {
        let record = ReceiptUrl::new("https://mev.sfs.md/x", "md-J403001576-1");
        assert_eq!(record.id, url_hash("https://mev.sfs.md/x"));
        assert_eq!(record.country_code, CountryCode::Moldova);
    }
}
