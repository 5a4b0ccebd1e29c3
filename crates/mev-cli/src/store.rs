//! JSON-file-backed receipt store.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mev_core::{Receipt, ReceiptStore, ReceiptUrl, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    receipts: HashMap<String, Receipt>,
    urls: HashMap<String, ReceiptUrl>,
}

/// Store keeping all receipts and URL records in one JSON file.
///
/// Writes are whole-file rewrites under a lock; good enough for a
/// single-user CLI, not meant for concurrent processes.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreFile>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            StoreFile::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, state: &StoreFile) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError(format!("serialize store: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| StoreError(format!("write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl ReceiptStore for JsonFileStore {
    async fn find_by_url_hash(&self, hash: &str) -> Result<Option<Receipt>, StoreError> {
        let state = self.state.lock().expect("store lock");
        let Some(record) = state.urls.get(hash) else {
            return Ok(None);
        };
        Ok(state.receipts.get(&record.receipt_id).cloned())
    }

    async fn put_receipt(&self, receipt: &Receipt) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store lock");
        state.receipts.insert(receipt.id.clone(), receipt.clone());
        self.flush(&state)
    }

    async fn put_url_record(&self, record: &ReceiptUrl) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("store lock");
        state.urls.insert(record.id.clone(), record.clone());
        self.flush(&state)
    }
}
