//! Core library for Moldovan fiscal e-receipt extraction.
//!
//! This crate provides:
//! - Blob location (the Livewire payload embedded in a verification page)
//! - Section partitioning and field recovery (units, quantities, dates)
//! - Receipt assembly into an immutable, validated domain object
//! - An idempotent lookup/fetch/parse/persist orchestrator over
//!   caller-supplied fetch and store collaborators

pub mod error;
pub mod models;
pub mod parser;
pub mod service;

pub use error::{ParseError, ProcessError, Result, StoreError};
pub use models::receipt::{
    BarcodeStatus, CountryCode, CurrencyCode, PurchasedItem, Receipt, Unit,
};
pub use models::receipt_url::{url_hash, ReceiptUrl};
pub use parser::{parse_page, ReceiptBlob, ReceiptSections};
pub use service::{MemoryStore, PageFetcher, ReceiptProcessor, ReceiptStore};
