//! Live fetch strategy chain
//!
//! An ordered list of independent strategies, each turning a [`FetchTarget`]
//! into a [`PartialProfile`] or nothing. The chain tries them in order and
//! stops at the first one that yields a profile.
//!
//! # Strategies
//! 1. **relay** - third-party relay endpoints, one strategy per relay
//! 2. **direct** - direct fetch with browser-like headers
//! 3. **own_server** - first-party relay, if configured
//! 4. **reference** - network-free parse of the reference itself
//!
//! # Error isolation
//! A strategy error is logged and treated exactly like "no data": the chain
//! moves on. The chain itself never fails.

pub mod direct;
pub mod own_server;
pub mod reference;
pub mod relay;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::extract::MarkupExtractor;
use crate::types::PartialProfile;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use direct::DirectStrategy;
pub use own_server::OwnServerStrategy;
pub use reference::ReferenceStrategy;
pub use relay::RelayStrategy;

/// What a strategy is asked to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    /// URL-like external reference
    pub reference: String,
    pub stable_id: Option<String>,
    pub name: Option<String>,
}

impl FetchTarget {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            stable_id: None,
            name: None,
        }
    }
}

/// One pluggable fetch attempt
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &str;

    /// `Ok(None)` is the normal "no data" outcome
    async fn attempt(&self, target: &FetchTarget) -> Result<Option<PartialProfile>, FetchError>;
}

/// Result of running the chain
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    Fetched {
        strategy: String,
        partial: PartialProfile,
    },
    /// Every strategy returned nothing or failed
    Exhausted {
        attempted: usize,
        last_error: Option<String>,
    },
}

impl ChainOutcome {
    /// Human-readable failure reason, for fallback tagging
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Fetched { .. } => None,
            Self::Exhausted {
                attempted,
                last_error: Some(e),
            } => Some(format!("all {attempted} fetch strategies failed (last error: {e})")),
            Self::Exhausted { attempted, .. } => {
                Some(format!("no data from {attempted} fetch strategies"))
            }
        }
    }
}

/// Ordered, early-exit strategy chain
pub struct StrategyChain {
    strategies: Vec<Arc<dyn FetchStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Arc<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Default chain: configured relays, direct, own-server, reference parse
    pub fn from_config(
        config: &FetchConfig,
        extractor: Arc<dyn MarkupExtractor>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;
        let timeout = config.timeout();

        let mut strategies: Vec<Arc<dyn FetchStrategy>> = config
            .relays
            .iter()
            .map(|relay| {
                Arc::new(RelayStrategy::new(
                    relay.clone(),
                    client.clone(),
                    timeout,
                    Arc::clone(&extractor),
                )) as Arc<dyn FetchStrategy>
            })
            .collect();
        strategies.push(Arc::new(DirectStrategy::new(
            client.clone(),
            timeout,
            Arc::clone(&extractor),
        )));
        strategies.push(Arc::new(OwnServerStrategy::new(
            config.own_server_url.clone(),
            client,
            timeout,
            Arc::clone(&extractor),
        )));
        strategies.push(Arc::new(ReferenceStrategy));

        Ok(Self::new(strategies))
    }

    /// Try each strategy in order; stop at the first profile
    pub async fn run(&self, target: &FetchTarget) -> ChainOutcome {
        let mut last_error = None;

        for (index, strategy) in self.strategies.iter().enumerate() {
            let name = strategy.name();
            match strategy.attempt(target).await {
                Ok(Some(partial)) => {
                    debug!(
                        strategy = name,
                        reference = %target.reference,
                        "Fetch strategy produced a profile"
                    );
                    return ChainOutcome::Fetched {
                        strategy: name.to_string(),
                        partial,
                    };
                }
                Ok(None) => {
                    debug!(strategy = name, position = index + 1, "Fetch strategy returned no data");
                }
                Err(e) => {
                    debug!(
                        strategy = name,
                        position = index + 1,
                        error = %e,
                        "Fetch strategy failed, trying next"
                    );
                    last_error = Some(format!("{}: {}", name, e));
                }
            }
        }

        warn!(
            reference = %target.reference,
            attempted = self.strategies.len(),
            "All fetch strategies exhausted"
        );
        ChainOutcome::Exhausted {
            attempted: self.strategies.len(),
            last_error,
        }
    }

    /// Strategy names in chain order
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Send a GET with an independent timeout and return the body text
pub(crate) async fn fetch_text(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<String, FetchError> {
    let send = async {
        let response = request.send().await?.error_for_status()?;
        Ok::<_, FetchError>(response.text().await?)
    };

    tokio::time::timeout(timeout, send)
        .await
        .map_err(|_| FetchError::Timeout(timeout))?
}

// ============================================================================
// Mock Strategy for Testing
// ============================================================================


// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::mock::MockStrategy;
    use super::*;
    use crate::extract::PageExtractor;

    fn partial(overall: u8) -> PartialProfile {
        PartialProfile {
            overall: Some(overall),
            ..PartialProfile::default()
        }
    }

    fn target() -> FetchTarget {
        FetchTarget::new("https://sofifa.com/player/239085/erling-haaland/")
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let first = Arc::new(MockStrategy::returning("first", partial(91)));
        let rest: Vec<Arc<MockStrategy>> = (0..3)
            .map(|_| Arc::new(MockStrategy::returning("later", partial(50))))
            .collect();

        let mut strategies: Vec<Arc<dyn FetchStrategy>> = vec![first.clone()];
        strategies.extend(rest.iter().map(|s| s.clone() as Arc<dyn FetchStrategy>));
        let chain = StrategyChain::new(strategies);

        let outcome = chain.run(&target()).await;

        assert_eq!(
            outcome,
            ChainOutcome::Fetched {
                strategy: "first".to_string(),
                partial: partial(91),
            }
        );
        assert_eq!(first.calls(), 1);
        assert!(rest.iter().all(|s| s.calls() == 0), "Later strategies must not run");
    }

    #[tokio::test]
    async fn test_errors_and_empty_results_fall_through() {
        let failing = Arc::new(MockStrategy::failing("broken"));
        let empty = Arc::new(MockStrategy::empty("empty"));
        let working = Arc::new(MockStrategy::returning("working", partial(80)));

        let strategies: Vec<Arc<dyn FetchStrategy>> =
            vec![failing.clone(), empty.clone(), working.clone()];
        let outcome = StrategyChain::new(strategies).run(&target()).await;

        assert!(matches!(outcome, ChainOutcome::Fetched { ref strategy, .. } if strategy == "working"));
        assert_eq!((failing.calls(), empty.calls(), working.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_exhausted_reports_last_error() {
        let strategies: Vec<Arc<dyn FetchStrategy>> = vec![
            Arc::new(MockStrategy::failing("broken")),
            Arc::new(MockStrategy::empty("empty")),
        ];
        let chain = StrategyChain::new(strategies);

        let outcome = chain.run(&target()).await;

        assert_eq!(
            outcome,
            ChainOutcome::Exhausted {
                attempted: 2,
                last_error: Some("broken: Network error: Mock failure".to_string()),
            }
        );
        assert!(outcome.failure_reason().unwrap().contains("all 2 fetch strategies failed"));
    }

    #[tokio::test]
    async fn test_empty_chain_is_exhausted() {
        let chain = StrategyChain::new(Vec::new());
        assert!(chain.is_empty());
        assert_eq!(
            chain.run(&target()).await.failure_reason().as_deref(),
            Some("no data from 0 fetch strategies")
        );
    }

    #[tokio::test]
    async fn test_default_chain_order() {
        let chain =
            StrategyChain::from_config(&FetchConfig::default(), Arc::new(PageExtractor)).unwrap();

        assert_eq!(
            chain.names(),
            vec!["allorigins", "corsproxy", "direct", "own_server", "reference"]
        );
    }
}
