//! Batch resolution in bounded waves
//!
//! Queries are split into sequential waves of at most `batch_size`. Every
//! item of a wave runs as its own task; a failed or panicked item becomes a
//! failure descriptor instead of aborting the wave. A fixed delay separates
//! consecutive waves. Output order always matches input order.

use crate::config::BatchConfig;
use crate::error::ResolveResult;
use crate::orchestrator::EnrichmentOrchestrator;
use crate::types::{Query, Resolution};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that resolves a single query
#[async_trait]
pub trait Resolve: Send + Sync + 'static {
    async fn resolve(&self, query: &Query) -> ResolveResult<Resolution>;
}

#[async_trait]
impl Resolve for EnrichmentOrchestrator {
    async fn resolve(&self, query: &Query) -> ResolveResult<Resolution> {
        EnrichmentOrchestrator::resolve(self, query).await
    }
}

/// Per-item batch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    Resolved { resolution: Resolution },
    Failed { query: String, error: String },
}

impl BatchOutcome {
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::Resolved { resolution } => Some(resolution),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Wave-based batch resolver
pub struct BatchResolver<R: Resolve> {
    resolver: Arc<R>,
    config: BatchConfig,
}

impl<R: Resolve> BatchResolver<R> {
    pub fn new(resolver: Arc<R>, config: BatchConfig) -> Self {
        Self { resolver, config }
    }

    /// Resolve with the configured wave size and delay
    pub async fn resolve_all(&self, queries: Vec<Query>) -> Vec<BatchOutcome> {
        self.resolve_many(queries, self.config.size, self.config.delay())
            .await
    }

    /// Resolve `queries` in waves of at most `batch_size`, pausing
    /// `inter_batch_delay` between waves
    pub async fn resolve_many(
        &self,
        queries: Vec<Query>,
        batch_size: usize,
        inter_batch_delay: Duration,
    ) -> Vec<BatchOutcome> {
        let batch_size = batch_size.max(1);
        let total = queries.len();
        let waves = total.div_ceil(batch_size);
        let mut outcomes = Vec::with_capacity(total);

        for (index, wave) in queries.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(inter_batch_delay).await;
            }
            debug!(wave = index + 1, waves, size = wave.len(), "Starting batch wave");

            let handles = wave.iter().cloned().map(|query| {
                let resolver = Arc::clone(&self.resolver);
                let name = query.name.clone();
                let handle = tokio::spawn(async move { resolver.resolve(&query).await });
                (name, handle)
            });
            let (names, handles): (Vec<String>, Vec<_>) = handles.unzip();

            for (query, joined) in names.into_iter().zip(join_all(handles).await) {
                let outcome = match joined {
                    Ok(Ok(resolution)) => BatchOutcome::Resolved { resolution },
                    Ok(Err(e)) => {
                        warn!(query = %query, error = %e, "Batch item failed");
                        BatchOutcome::Failed {
                            query,
                            error: e.to_string(),
                        }
                    }
                    Err(e) => {
                        warn!(query = %query, error = %e, "Batch item task aborted");
                        BatchOutcome::Failed {
                            query,
                            error: format!("Resolution task failed: {}", e),
                        }
                    }
                };
                outcomes.push(outcome);
            }
        }

        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        info!(total, waves, failed, "Batch resolution complete");
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::types::{CanonicalProfile, RatedPlayer, Source};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records wave membership by start instant; fails or panics on demand
    struct RecordingResolver {
        starts: Mutex<Vec<(String, Instant)>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl RecordingResolver {
        fn new() -> Self {
            Self {
                starts: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn wave_sizes(&self) -> Vec<usize> {
            let mut starts = self.starts.lock().unwrap().clone();
            starts.sort_by_key(|(_, at)| *at);
            let mut sizes: Vec<usize> = Vec::new();
            let mut last: Option<Instant> = None;
            for (_, at) in starts {
                if last == Some(at) {
                    *sizes.last_mut().unwrap() += 1;
                } else {
                    sizes.push(1);
                    last = Some(at);
                }
            }
            sizes
        }
    }

    #[async_trait]
    impl Resolve for RecordingResolver {
        async fn resolve(&self, query: &Query) -> ResolveResult<Resolution> {
            self.starts
                .lock()
                .unwrap()
                .push((query.name.clone(), Instant::now()));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match query.name.as_str() {
                "error" => Err(ResolveError::Internal("forced failure".to_string())),
                "panic" => panic!("forced panic"),
                name => Ok(Resolution::Found {
                    query: name.to_string(),
                    profile: CanonicalProfile::new(
                        RatedPlayer::with_defaults(name, 70),
                        Source::Database,
                        chrono::Utc::now(),
                    ),
                    matched_name: None,
                    fallback_reason: None,
                }),
            }
        }
    }

    fn queries(names: &[&str]) -> Vec<Query> {
        names.iter().map(|n| Query::new(*n)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_waves_of_three_with_isolated_failure() {
        let resolver = Arc::new(RecordingResolver::new());
        let batch = BatchResolver::new(resolver.clone(), BatchConfig::default());

        let started = Instant::now();
        let outcomes = batch
            .resolve_many(
                queries(&["p1", "p2", "p3", "panic", "p5", "p6", "p7"]),
                3,
                Duration::from_millis(1000),
            )
            .await;

        assert_eq!(resolver.wave_sizes(), vec![3, 3, 1]);
        assert_eq!(resolver.peak.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(2000));

        assert_eq!(outcomes.len(), 7);
        assert!(outcomes[3].is_failed());
        let names: Vec<&str> = outcomes
            .iter()
            .filter_map(|o| o.resolution())
            .map(|r| r.query())
            .collect();
        assert_eq!(names, vec!["p1", "p2", "p3", "p5", "p6", "p7"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_becomes_failure_descriptor() {
        let resolver = Arc::new(RecordingResolver::new());
        let batch = BatchResolver::new(resolver, BatchConfig::default());

        let outcomes = batch.resolve_all(queries(&["p1", "error"])).await;

        assert_eq!(
            outcomes[1],
            BatchOutcome::Failed {
                query: "error".to_string(),
                error: "Internal error: forced failure".to_string(),
            }
        );
        assert!(!outcomes[0].is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_batch_size_runs_one_at_a_time() {
        let resolver = Arc::new(RecordingResolver::new());
        let batch = BatchResolver::new(resolver.clone(), BatchConfig::default());

        let outcomes = batch
            .resolve_many(queries(&["a", "b"]), 0, Duration::from_millis(5))
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(resolver.wave_sizes(), vec![1, 1]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let batch = BatchResolver::new(Arc::new(RecordingResolver::new()), BatchConfig::default());
        assert!(batch.resolve_all(Vec::new()).await.is_empty());
    }
}
