//! Enrichment orchestrator
//!
//! Entry point of the pipeline. Tiers run strictly in order:
//!
//! 1. Result cache, by the caller's stable identifier
//! 2. Local dataset, exact normalized name
//! 3. Local dataset, fuzzy match
//! 4. Result cache, by the identifier the dataset entry carries
//! 5. Live enrichment (rate limiter, then fetch chain), if permitted
//! 6. Cache write
//!
//! Local data is authoritative; live data only ever enhances a profile that
//! the dataset already produced. Every tier fails soft into the next.
//!
//! The cache and rate window belong to one orchestrator instance.

use crate::cache::{CacheEntry, ResultCache};
use crate::config::ResolverConfig;
use crate::dataset::LocalDatasetStore;
use crate::error::{ResolveError, ResolveResult};
use crate::extract::PageExtractor;
use crate::fetch::{ChainOutcome, FetchTarget, StrategyChain};
use crate::matcher::SimilarityMatcher;
use crate::normalize::normalize_name;
use crate::rate_limiter::RateLimiter;
use crate::types::{CanonicalProfile, Query, RatedPlayer, Resolution, Source};
use scout_common::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reason recorded when the rate window denies a live attempt
pub const RATE_LIMITED_REASON: &str = "rate limit exceeded";

/// Cache → dataset → live enrichment sequencer
pub struct EnrichmentOrchestrator {
    dataset: LocalDatasetStore,
    matcher: SimilarityMatcher,
    cache: ResultCache,
    rate_limiter: RateLimiter,
    chain: StrategyChain,
    clock: Arc<dyn Clock>,
}

impl EnrichmentOrchestrator {
    /// Orchestrator with the configured dataset and the default fetch chain
    pub fn new(config: &ResolverConfig, clock: Arc<dyn Clock>) -> ResolveResult<Self> {
        let chain = StrategyChain::from_config(&config.fetch, Arc::new(PageExtractor))
            .map_err(|e| ResolveError::Internal(e.to_string()))?;
        let dataset = LocalDatasetStore::new(config.dataset.clone(), Arc::clone(&clock));
        Ok(Self::with_parts(config, dataset, chain, clock))
    }

    /// Orchestrator over caller-supplied dataset and chain
    pub fn with_parts(
        config: &ResolverConfig,
        dataset: LocalDatasetStore,
        chain: StrategyChain,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dataset,
            matcher: SimilarityMatcher::new(config.matching.clone()),
            cache: ResultCache::new(config.cache.ttl(), Arc::clone(&clock)),
            rate_limiter: RateLimiter::from_config(&config.rate_limit, Arc::clone(&clock)),
            chain,
            clock,
        }
    }

    /// Resolve one query
    ///
    /// "No tier produced a profile" is `Ok(Resolution::NotFound)`, including
    /// a name that normalizes to nothing.
    pub async fn resolve(&self, query: &Query) -> ResolveResult<Resolution> {
        let normalized = normalize_name(&query.name);
        if normalized.is_empty() {
            debug!(query = %query.name, "Blank query name");
            return Ok(Resolution::NotFound {
                query: query.name.clone(),
            });
        }

        if let Some(id) = &query.options.stable_id {
            if let Some(entry) = self.cache.get(id).await {
                debug!(query = %query.name, stable_id = %id, "Cache hit");
                return Ok(cached(query, entry));
            }
        }

        let Some((player, tier, matched_name)) = self.lookup_dataset(&normalized).await else {
            info!(query = %query.name, "No tier produced a profile");
            return Ok(Resolution::NotFound {
                query: query.name.clone(),
            });
        };

        let cache_key = query
            .options
            .stable_id
            .clone()
            .or_else(|| player.external_id.clone());

        if query.options.stable_id.is_none() {
            if let Some(id) = &cache_key {
                if let Some(entry) = self.cache.get(id).await {
                    debug!(query = %query.name, stable_id = %id, "Cache hit on discovered identifier");
                    return Ok(cached(query, entry));
                }
            }
        }

        let mut resolved = (*player).clone();
        let (source, fallback_reason) = if query.options.allow_network {
            self.enrich(&mut resolved, tier, cache_key.as_deref()).await
        } else {
            (tier, None)
        };

        let profile = CanonicalProfile::new(resolved, source, self.clock.now());
        if let Some(key) = cache_key {
            self.cache.insert(key, profile.clone()).await;
        }

        info!(
            query = %query.name,
            matched = %profile.player.name,
            source = %source,
            "Resolved"
        );

        Ok(Resolution::Found {
            query: query.name.clone(),
            profile,
            matched_name,
            fallback_reason,
        })
    }

    /// Exact then fuzzy dataset lookup
    async fn lookup_dataset(
        &self,
        normalized: &str,
    ) -> Option<(Arc<RatedPlayer>, Source, Option<String>)> {
        if let Some(player) = self.dataset.lookup_exact(normalized).await {
            debug!(normalized = %normalized, "Exact dataset match");
            return Some((player, Source::Database, None));
        }

        let candidate = self.dataset.find_fuzzy(normalized, &self.matcher).await?;
        let matched_name = candidate.player.name.clone();
        Some((candidate.player, Source::DatabaseFuzzy, Some(matched_name)))
    }

    /// Live tier: overlay fetched fields, or fall back with a reason
    async fn enrich(
        &self,
        player: &mut RatedPlayer,
        tier: Source,
        stable_id: Option<&str>,
    ) -> (Source, Option<String>) {
        let Some(reference) = player.reference.clone() else {
            debug!(player = %player.name, "No external reference, live enrichment skipped");
            return (tier, None);
        };

        if !self.rate_limiter.try_acquire().await {
            warn!(player = %player.name, "Rate limited, keeping dataset profile");
            return (tier.fallback(), Some(RATE_LIMITED_REASON.to_string()));
        }

        let target = FetchTarget {
            reference,
            stable_id: stable_id.map(str::to_string),
            name: Some(player.name.clone()),
        };

        match self.chain.run(&target).await {
            ChainOutcome::Fetched { strategy, partial } => {
                debug!(player = %player.name, strategy = %strategy, "Merging fetched fields");
                player.merge_partial(&partial);
                (Source::LiveEnhanced, None)
            }
            exhausted => (tier.fallback(), exhausted.failure_reason()),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn dataset(&self) -> &LocalDatasetStore {
        &self.dataset
    }
}

/// Cached profile, re-tagged as a cache hit
fn cached(query: &Query, entry: CacheEntry) -> Resolution {
    let mut profile = entry.profile;
    profile.provenance.source = Source::Cache;
    Resolution::Found {
        query: query.name.clone(),
        profile,
        matched_name: None,
        fallback_reason: None,
    }
}
