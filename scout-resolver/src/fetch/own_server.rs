//! First-party relay strategy
//!
//! Delegates to an intermediary endpoint the application operates itself.
//! An unconfigured endpoint is the normal "not available" outcome.

use super::{fetch_text, FetchStrategy, FetchTarget};
use crate::error::FetchError;
use crate::extract::MarkupExtractor;
use crate::types::PartialProfile;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct OwnServerStrategy {
    endpoint: Option<String>,
    client: Client,
    timeout: Duration,
    extractor: Arc<dyn MarkupExtractor>,
}

impl OwnServerStrategy {
    pub fn new(
        endpoint: Option<String>,
        client: Client,
        timeout: Duration,
        extractor: Arc<dyn MarkupExtractor>,
    ) -> Self {
        Self {
            endpoint,
            client,
            timeout,
            extractor,
        }
    }
}

#[async_trait]
impl FetchStrategy for OwnServerStrategy {
    fn name(&self) -> &str {
        "own_server"
    }

    async fn attempt(&self, target: &FetchTarget) -> Result<Option<PartialProfile>, FetchError> {
        let Some(endpoint) = &self.endpoint else {
            debug!("Own-server relay not configured");
            return Ok(None);
        };

        let mut params = vec![("url", target.reference.as_str())];
        if let Some(id) = &target.stable_id {
            params.push(("id", id.as_str()));
        }

        let body = fetch_text(self.client.get(endpoint).query(&params), self.timeout).await?;
        Ok(self.extractor.extract(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PageExtractor;
    use mockito::Matcher;

    fn strategy(endpoint: Option<String>) -> OwnServerStrategy {
        OwnServerStrategy::new(
            endpoint,
            Client::new(),
            Duration::from_secs(5),
            Arc::new(PageExtractor),
        )
    }

    #[tokio::test]
    async fn test_unconfigured_is_not_available() {
        let result = strategy(None)
            .attempt(&FetchTarget::new("https://sofifa.com/player/1/"))
            .await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_forwards_reference_and_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/player")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("url".into(), "https://sofifa.com/player/231747/".into()),
                Matcher::UrlEncoded("id".into(), "231747".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "Kylian Mbappé", "overall": 92, "potential": 95}"#)
            .expect(1)
            .create_async()
            .await;

        let target = FetchTarget {
            reference: "https://sofifa.com/player/231747/".to_string(),
            stable_id: Some("231747".to_string()),
            name: None,
        };
        let partial = strategy(Some(format!("{}/api/player", server.url())))
            .attempt(&target)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(partial.overall, Some(92));
        assert_eq!(partial.potential, Some(95));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/player")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let result = strategy(Some(format!("{}/api/player", server.url())))
            .attempt(&FetchTarget::new("https://sofifa.com/player/1/"))
            .await;

        assert!(matches!(result, Err(FetchError::Status(500))));
    }
}
