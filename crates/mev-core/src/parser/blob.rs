//! Blob locator: finds and decodes the receipt payload embedded in the
//! verification page markup.

use html_escape::decode_html_entities;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ParseError;

use super::patterns::RECEIPT_BLOB;

/// Sentinel row separating payload sections (48 backticks).
pub const SECTION_DELIMITER: &str =
    "````````````````````````````````````````````````";

/// How much of the page to keep for diagnostics when the marker is absent.
const PREVIEW_LEN: usize = 200;

/// Livewire component envelope around the receipt payload.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "serverMemo")]
    server_memo: ServerMemo,
}

#[derive(Debug, Deserialize)]
struct ServerMemo {
    data: MemoData,
}

#[derive(Debug, Deserialize)]
struct MemoData {
    receipt: Vec<BlobRow>,
}

/// One entry of the payload's receipt list: either the section sentinel
/// (a bare string) or a row of string fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BlobRow {
    Marker(String),
    Fields(Vec<String>),
}

impl BlobRow {
    /// Whether this entry is the section sentinel.
    pub fn is_delimiter(&self) -> bool {
        matches!(self, BlobRow::Marker(s) if s == SECTION_DELIMITER)
    }

    /// Row fields; a stray non-sentinel string is tolerated as a
    /// single-field row.
    pub fn into_fields(self) -> Vec<String> {
        match self {
            BlobRow::Marker(s) => vec![s],
            BlobRow::Fields(fields) => fields,
        }
    }
}

/// The located, decoded receipt payload.
#[derive(Debug, Clone)]
pub struct ReceiptBlob {
    pub rows: Vec<BlobRow>,
}

impl ReceiptBlob {
    /// Locate the payload attribute in `page`, unescape it and decode the
    /// envelope.
    ///
    /// The first matching attribute wins; further matches are ignored. A
    /// missing marker is a [`ParseError::BlobNotFound`] (the document is
    /// structurally not a receipt page); a marker whose content fails to
    /// decode is the louder [`ParseError::MalformedBlob`].
    pub fn locate(page: &str) -> Result<Self, ParseError> {
        let caps = match RECEIPT_BLOB.captures(page) {
            Some(caps) => caps,
            None => {
                let preview: String = page.chars().take(PREVIEW_LEN).collect();
                warn!("receipt data not found; page preview: {preview}");
                return Err(ParseError::BlobNotFound { preview });
            }
        };

        let raw = decode_html_entities(&caps[1]);
        let envelope: Envelope = serde_json::from_str(&raw)?;
        let rows = envelope.server_memo.data.receipt;
        debug!("located receipt blob with {} rows", rows.len());

        Ok(Self { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testutil::{encode_attribute, page_with_blob};

    #[test]
    fn test_missing_marker_is_blob_not_found() {
        let page = format!(
            "<html><body>{}</body></html>",
            "Bine ati venit la portalul de verificare. ".repeat(20)
        );
        let err = ReceiptBlob::locate(&page).unwrap_err();
        match err {
            ParseError::BlobNotFound { preview } => {
                assert_eq!(preview.chars().count(), 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_similar_marker_without_component_name_does_not_match() {
        // Another Livewire component on the same page must not satisfy
        // the locator.
        let page = format!(
            r#"<div wire:initial-data="{}"></div>"#,
            encode_attribute(r#"{"fingerprint":{"name":"navbar.search-component"}}"#)
        );
        assert!(matches!(
            ReceiptBlob::locate(&page),
            Err(ParseError::BlobNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_payload_is_a_distinct_failure() {
        let page = format!(
            r#"<div wire:initial-data="{}"></div>"#,
            encode_attribute(r#"{"fingerprint":"receipt.index-component","serverMemo":"#)
        );
        assert!(matches!(
            ReceiptBlob::locate(&page),
            Err(ParseError::MalformedBlob(_))
        ));
    }

    #[test]
    fn test_locates_rows_and_sentinels() {
        let rows = serde_json::json!([
            ["MERCHANT", "Cod fiscal: 1016600004811"],
            SECTION_DELIMITER,
            ["Item", "1 x 10.00"],
        ]);
        let page = page_with_blob(&rows);
        let blob = ReceiptBlob::locate(&page).unwrap();

        assert_eq!(blob.rows.len(), 3);
        assert!(!blob.rows[0].is_delimiter());
        assert!(blob.rows[1].is_delimiter());
        assert_eq!(
            blob.rows[2].clone().into_fields(),
            vec!["Item".to_string(), "1 x 10.00".to_string()]
        );
    }

    #[test]
    fn test_first_match_wins() {
        let first = serde_json::json!([["FIRST", "Cod fiscal: 1"]]);
        let second = serde_json::json!([["SECOND", "Cod fiscal: 2"]]);
        let page = format!("{}{}", page_with_blob(&first), page_with_blob(&second));

        let blob = ReceiptBlob::locate(&page).unwrap();
        assert_eq!(
            blob.rows[0].clone().into_fields()[0],
            "FIRST".to_string()
        );
    }
}
