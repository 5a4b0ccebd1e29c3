//! Lookup/persist orchestrator: idempotent end-to-end processing of a
//! receipt URL over caller-supplied fetch and store collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ProcessError, StoreError};
use crate::models::receipt::Receipt;
use crate::models::receipt_url::{url_hash, ReceiptUrl};
use crate::parser::parse_page;

/// URL prefixes accepted by this source adapter.
pub const ALLOWED_URL_PREFIXES: [&str; 2] = [
    "https://mev.sfs.md/receipt-verifier/",
    "https://sift-mev.sfs.md/receipt/",
];

/// Whether a URL belongs to a supported verification portal.
pub fn is_supported_url(url: &str) -> bool {
    ALLOWED_URL_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Page-fetch collaborator. Returns the page text, or `None` on failure;
/// retry and fallback policy live behind this trait, not in the
/// orchestrator.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// Persistence collaborator. Receipts are keyed by their own id; URL
/// records map URL hashes to receipt ids. Both writes are idempotent
/// upserts.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    async fn find_by_url_hash(&self, hash: &str) -> Result<Option<Receipt>, StoreError>;
    async fn put_receipt(&self, receipt: &Receipt) -> Result<(), StoreError>;
    async fn put_url_record(&self, record: &ReceiptUrl) -> Result<(), StoreError>;
}

/// Orchestrates lookup, fetch, parse and persist for one source format.
pub struct ReceiptProcessor<F, S> {
    fetcher: F,
    store: S,
}

impl<F: PageFetcher, S: ReceiptStore> ReceiptProcessor<F, S> {
    pub fn new(fetcher: F, store: S) -> Self {
        Self { fetcher, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process a receipt URL for `user_id`.
    ///
    /// The existence check always happens before any fetch: a receipt
    /// already stored under the URL hash is returned as-is, with no
    /// network traffic. Otherwise the page is fetched, parsed and
    /// persisted together with lookup records for both the original and
    /// the canonical URL form. No step is retried; concurrent misses for
    /// the same URL resolve through the store's own upsert semantics.
    pub async fn process_url(&self, url: &str, user_id: Uuid) -> Result<Receipt, ProcessError> {
        if !is_supported_url(url) {
            return Err(ProcessError::UnsupportedUrl(url.to_string()));
        }

        let hash = url_hash(url);
        if let Some(existing) = self.store.find_by_url_hash(&hash).await? {
            info!("receipt {} found in store, skipping fetch", existing.id);
            return Ok(existing);
        }

        let page = self
            .fetcher
            .fetch(url)
            .await
            .filter(|page| !page.is_empty())
            .ok_or(ProcessError::FetchFailed)?;
        debug!("fetched {} bytes for {url}", page.len());

        let receipt = parse_page(&page, user_id, url)?;

        // Independent best-effort writes; the source system has no
        // multi-write transaction primitive.
        self.store.put_receipt(&receipt).await?;
        self.store
            .put_url_record(&ReceiptUrl::new(url, &receipt.id))
            .await?;
        if receipt.receipt_canonical_url != url {
            self.store
                .put_url_record(&ReceiptUrl::new(&receipt.receipt_canonical_url, &receipt.id))
                .await?;
        }

        info!("processed receipt {} ({} purchases)", receipt.id, receipt.purchases.len());
        Ok(receipt)
    }
}

/// In-memory store: the reference [`ReceiptStore`] implementation, used
/// by tests and as the CLI's fallback backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    receipts: Mutex<HashMap<String, Receipt>>,
    urls: Mutex<HashMap<String, ReceiptUrl>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn find_by_url_hash(&self, hash: &str) -> Result<Option<Receipt>, StoreError> {
        let urls = self.urls.lock().expect("urls lock");
        let Some(record) = urls.get(hash) else {
            return Ok(None);
        };
        let receipts = self.receipts.lock().expect("receipts lock");
        Ok(receipts.get(&record.receipt_id).cloned())
    }

    async fn put_receipt(&self, receipt: &Receipt) -> Result<(), StoreError> {
        self.receipts
            .lock()
            .expect("receipts lock")
            .insert(receipt.id.clone(), receipt.clone());
        Ok(())
    }

    async fn put_url_record(&self, record: &ReceiptUrl) -> Result<(), StoreError> {
        self.urls
            .lock()
            .expect("urls lock")
            .insert(record.id.clone(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::parser::testutil::{kaufland_page, KAUFLAND_URL, USER_ID};
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher returning a canned page and counting invocations.
    struct CountingFetcher {
        page: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn returning(page: Option<String>) -> Self {
            Self {
                page,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<'a> PageFetcher for &'a CountingFetcher {
        async fn fetch(&self, _url: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.page.clone()
        }
    }

    fn user() -> Uuid {
        Uuid::from_str(USER_ID).unwrap()
    }

    #[tokio::test]
    async fn test_process_is_idempotent() {
        let fetcher = CountingFetcher::returning(Some(kaufland_page()));
        let processor = ReceiptProcessor::new(&fetcher, MemoryStore::new());

        let first = processor.process_url(KAUFLAND_URL, user()).await.unwrap();
        let second = processor.process_url(KAUFLAND_URL, user()).await.unwrap();

        assert_eq!(first.id, second.id);
        // Second call short-circuited on the URL hash: no second fetch
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_happens_before_fetch() {
        let fetcher = CountingFetcher::returning(Some(kaufland_page()));
        let store = MemoryStore::new();

        // Pre-seed the store under the URL hash
        let seeded = parse_page(&kaufland_page(), user(), KAUFLAND_URL).unwrap();
        store.put_receipt(&seeded).await.unwrap();
        store
            .put_url_record(&ReceiptUrl::new(KAUFLAND_URL, &seeded.id))
            .await
            .unwrap();

        let processor = ReceiptProcessor::new(&fetcher, store);
        let receipt = processor.process_url(KAUFLAND_URL, user()).await.unwrap();
        assert_eq!(receipt.key, 25312);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_both_url_forms_are_stored() {
        // A sift-portal URL whose canonical form differs
        let url = "https://sift-mev.sfs.md/receipt/J702003194/370.85/25312/2024-01-17";
        let fetcher = CountingFetcher::returning(Some(kaufland_page()));
        let processor = ReceiptProcessor::new(&fetcher, MemoryStore::new());

        let receipt = processor.process_url(url, user()).await.unwrap();
        assert_ne!(receipt.receipt_canonical_url, url);

        let by_original = processor.store().find_by_url_hash(&url_hash(url)).await.unwrap();
        let by_canonical = processor
            .store()
            .find_by_url_hash(&url_hash(&receipt.receipt_canonical_url))
            .await
            .unwrap();
        assert_eq!(by_original.as_ref().map(|r| &r.id), Some(&receipt.id));
        assert_eq!(by_canonical.as_ref().map(|r| &r.id), Some(&receipt.id));
    }

    #[tokio::test]
    async fn test_unsupported_url_is_rejected_without_fetch() {
        let fetcher = CountingFetcher::returning(Some(kaufland_page()));
        let processor = ReceiptProcessor::new(&fetcher, MemoryStore::new());

        let err = processor
            .process_url("https://example.com/receipt/1", user())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::UnsupportedUrl(_)));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_terminal() {
        let fetcher = CountingFetcher::returning(None);
        let processor = ReceiptProcessor::new(&fetcher, MemoryStore::new());

        let err = processor.process_url(KAUFLAND_URL, user()).await.unwrap_err();
        assert!(matches!(err, ProcessError::FetchFailed));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_page_counts_as_fetch_failure() {
        let fetcher = CountingFetcher::returning(Some(String::new()));
        let processor = ReceiptProcessor::new(&fetcher, MemoryStore::new());

        let err = processor.process_url(KAUFLAND_URL, user()).await.unwrap_err();
        assert!(matches!(err, ProcessError::FetchFailed));
    }

    #[tokio::test]
    async fn test_markerless_page_surfaces_as_parse_error() {
        let fetcher = CountingFetcher::returning(Some("<html>nothing</html>".to_string()));
        let processor = ReceiptProcessor::new(&fetcher, MemoryStore::new());

        let err = processor.process_url(KAUFLAND_URL, user()).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Parse(ParseError::BlobNotFound { .. })
        ));
    }
}
