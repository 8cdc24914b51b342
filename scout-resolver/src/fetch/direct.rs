//! Direct fetch strategy
//!
//! Requests the reference itself with browser-like headers. Reference hosts
//! usually refuse this, so a failure here is expected and cheap.

use super::{fetch_text, FetchStrategy, FetchTarget};
use crate::error::FetchError;
use crate::extract::MarkupExtractor;
use crate::types::PartialProfile;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub struct DirectStrategy {
    client: Client,
    timeout: Duration,
    extractor: Arc<dyn MarkupExtractor>,
}

impl DirectStrategy {
    pub fn new(client: Client, timeout: Duration, extractor: Arc<dyn MarkupExtractor>) -> Self {
        Self {
            client,
            timeout,
            extractor,
        }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> &str {
        "direct"
    }

    async fn attempt(&self, target: &FetchTarget) -> Result<Option<PartialProfile>, FetchError> {
        if !target.reference.starts_with("http://") && !target.reference.starts_with("https://") {
            return Ok(None);
        }

        let request = self
            .client
            .get(&target.reference)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(CACHE_CONTROL, "no-cache");

        let body = fetch_text(request, self.timeout).await?;
        Ok(self.extractor.extract(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PageExtractor;

    fn strategy(timeout: Duration) -> DirectStrategy {
        DirectStrategy::new(Client::new(), timeout, Arc::new(PageExtractor))
    }

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/player/1/")
            .match_header("accept", ACCEPT_HTML)
            .match_header("cache-control", "no-cache")
            .with_status(200)
            .with_body("<html><body><h1>Direct Player</h1></body></html>")
            .create_async()
            .await;

        let target = FetchTarget::new(format!("{}/player/1/", server.url()));
        let partial = strategy(Duration::from_secs(5))
            .attempt(&target)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(partial.name.as_deref(), Some("Direct Player"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_url_reference_is_skipped() {
        let result = strategy(Duration::from_secs(5))
            .attempt(&FetchTarget::new("player:239085"))
            .await;
        assert!(matches!(result, Ok(None)));
    }
}
