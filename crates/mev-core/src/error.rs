//! Error types for the mev-core library.

use thiserror::Error;

/// Errors raised while extracting a receipt from page markup.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The embedded receipt payload marker is absent from the document.
    ///
    /// Carries a truncated preview of the page for diagnostics. This is
    /// structural: the document is not a receipt verification page, so
    /// retrying will not help.
    #[error("receipt data not found in document")]
    BlobNotFound { preview: String },

    /// The marker matched but the payload failed to decode as JSON.
    #[error("receipt payload is not valid JSON: {0}")]
    MalformedBlob(#[from] serde_json::Error),

    /// A section, row or field expected at a fixed position is missing.
    #[error("unexpected receipt layout: {0}")]
    Layout(String),

    /// A field was present but its value could not be parsed.
    #[error("failed to parse {field}: {value:?}")]
    Field { field: &'static str, value: String },
}

/// Error reported by a persistence collaborator.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Caller-facing outcome of processing a receipt URL.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The URL does not belong to a supported verification portal.
    #[error("unsupported receipt URL: {0}")]
    UnsupportedUrl(String),

    /// The fetch collaborator returned no content.
    #[error("failed to fetch receipt page")]
    FetchFailed,

    /// The page was fetched but is not a parseable receipt.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The document was valid but persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for the mev library.
pub type Result<T> = std::result::Result<T, ProcessError>;
