//! Data models for parsed receipts and their lookup records.

pub mod receipt;
pub mod receipt_url;
