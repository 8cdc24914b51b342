//! Third-party relay strategy
//!
//! Fetches the reference through a relay endpoint. Some relays return the
//! page itself; others wrap it in a JSON envelope (`{"contents": "..."}`)
//! that is unwrapped before extraction.

use super::{fetch_text, FetchStrategy, FetchTarget};
use crate::config::{Envelope, RelayConfig};
use crate::error::FetchError;
use crate::extract::MarkupExtractor;
use crate::types::PartialProfile;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One relay endpoint
pub struct RelayStrategy {
    relay: RelayConfig,
    client: Client,
    timeout: Duration,
    extractor: Arc<dyn MarkupExtractor>,
}

impl RelayStrategy {
    pub fn new(
        relay: RelayConfig,
        client: Client,
        timeout: Duration,
        extractor: Arc<dyn MarkupExtractor>,
    ) -> Self {
        Self {
            relay,
            client,
            timeout,
            extractor,
        }
    }

    /// Relay URL for a reference (`{url}` receives the percent-encoded reference)
    pub fn relay_url(&self, reference: &str) -> String {
        self.relay
            .url_template
            .replace("{url}", &urlencoding::encode(reference))
    }
}

#[async_trait]
impl FetchStrategy for RelayStrategy {
    fn name(&self) -> &str {
        &self.relay.name
    }

    async fn attempt(&self, target: &FetchTarget) -> Result<Option<PartialProfile>, FetchError> {
        let url = self.relay_url(&target.reference);
        debug!(relay = %self.relay.name, url = %url, "Fetching through relay");

        let body = fetch_text(self.client.get(&url), self.timeout).await?;
        let content = match self.relay.envelope {
            Envelope::Raw => body,
            Envelope::JsonContents => unwrap_contents(&body)?,
        };

        Ok(self.extractor.extract(&content))
    }
}

/// Pull the page out of a `{"contents": "..."}` envelope
pub fn unwrap_contents(body: &str) -> Result<String, FetchError> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Invalid relay envelope: {}", e)))?;

    match envelope.get("contents") {
        Some(Value::String(contents)) if !contents.trim().is_empty() => Ok(contents.clone()),
        Some(Value::String(_)) => Err(FetchError::Parse("Empty relay contents".to_string())),
        _ => Err(FetchError::Parse(
            "Relay envelope has no contents field".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PageExtractor;

    const PAGE: &str = r#"<html><head><meta property="og:title" content="Erling Haaland FC 24"></head>
        <body><span data-stat="overall">91</span></body></html>"#;

    fn relay(name: &str, url_template: String, envelope: Envelope) -> RelayStrategy {
        RelayStrategy::new(
            RelayConfig {
                name: name.to_string(),
                url_template,
                envelope,
            },
            Client::new(),
            Duration::from_secs(5),
            Arc::new(PageExtractor),
        )
    }

    #[test]
    fn test_relay_url_encodes_reference() {
        let strategy = relay("r", "https://relay.test/get?url={url}".to_string(), Envelope::Raw);
        assert_eq!(
            strategy.relay_url("https://sofifa.com/player/1/a-b/"),
            "https://relay.test/get?url=https%3A%2F%2Fsofifa.com%2Fplayer%2F1%2Fa-b%2F"
        );
    }

    #[test]
    fn test_unwrap_contents() {
        assert_eq!(unwrap_contents(r#"{"contents": "<p>x</p>"}"#).unwrap(), "<p>x</p>");
        assert!(matches!(unwrap_contents(r#"{"contents": ""}"#), Err(FetchError::Parse(_))));
        assert!(matches!(unwrap_contents(r#"{"status": 200}"#), Err(FetchError::Parse(_))));
        assert!(matches!(unwrap_contents("<html>"), Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_raw_relay_extracts_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/raw")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(PAGE)
            .expect(1)
            .create_async()
            .await;

        let strategy = relay("raw", format!("{}/raw?{{url}}", server.url()), Envelope::Raw);
        let partial = strategy
            .attempt(&FetchTarget::new("https://sofifa.com/player/239085/"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(partial.name.as_deref(), Some("Erling Haaland"));
        assert_eq!(partial.overall, Some(91));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_json_envelope_relay() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({ "contents": PAGE, "status": { "http_code": 200 } });
        let _mock = server
            .mock("GET", "/get")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let strategy = relay(
            "wrapped",
            format!("{}/get?url={{url}}", server.url()),
            Envelope::JsonContents,
        );
        let partial = strategy
            .attempt(&FetchTarget::new("https://sofifa.com/player/239085/"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(partial.overall, Some(91));
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/get")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let strategy = relay("down", format!("{}/get?url={{url}}", server.url()), Envelope::Raw);
        let result = strategy.attempt(&FetchTarget::new("https://x.test/")).await;

        assert!(matches!(result, Err(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn test_unparseable_page_is_no_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/get")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html><body><p>Access denied</p></body></html>")
            .create_async()
            .await;

        let strategy = relay("blocked", format!("{}/get?url={{url}}", server.url()), Envelope::Raw);
        let result = strategy.attempt(&FetchTarget::new("https://x.test/")).await;

        assert!(matches!(result, Ok(None)));
    }
}
