//! HTTP page fetcher for the verification portal.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use mev_core::PageFetcher;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64)";
const ACCEPT_LANGUAGE: &str = "ro-MD,ro;q=0.9,en-US;q=0.8,en;q=0.7,ru;q=0.6";

/// Plain reqwest fetcher. One attempt, no proxy fallbacks; failures are
/// logged and reported as `None` per the collaborator contract.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let resp = match self
            .client
            .get(url)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("GET {url} failed: {e}");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!("GET {url} response_code={}", resp.status());
            return None;
        }

        match resp.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("GET {url} body read failed: {e}");
                None
            }
        }
    }
}
