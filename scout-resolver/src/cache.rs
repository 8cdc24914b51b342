//! Time-bounded result cache
//!
//! Entries are keyed by stable identifier. Staleness is checked lazily at
//! read time; reads never evict. `purge_stale` removes stale entries on demand.

use crate::types::CanonicalProfile;
use chrono::{DateTime, Duration, Utc};
use scout_common::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One cached resolution
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub profile: CanonicalProfile,
    pub inserted_at: DateTime<Utc>,
}

/// TTL cache of resolved profiles
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Live entry for `key`, or `None` if absent or stale
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !self.is_stale(entry, now))
            .cloned()
    }

    /// Insert or replace the entry for `key`, stamped with the current time
    pub async fn insert(&self, key: impl Into<String>, profile: CanonicalProfile) {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            profile,
            inserted_at: self.clock.now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Drop every stale entry; returns how many were removed
    pub async fn purge_stale(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_stale(entry, now));
        before - entries.len()
    }

    /// Stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at > self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RatedPlayer, Source};
    use scout_common::ManualClock;

    fn profile(name: &str, at: DateTime<Utc>) -> CanonicalProfile {
        CanonicalProfile::new(RatedPlayer::with_defaults(name, 80), Source::Database, at)
    }

    #[tokio::test]
    async fn test_entry_live_within_ttl() {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = ResultCache::new(Duration::hours(1), clock.clone());

        cache.insert("239085", profile("Erling Haaland", clock.now())).await;
        clock.advance(Duration::minutes(59));

        let entry = cache.get("239085").await.unwrap();
        assert_eq!(entry.profile.player.name, "Erling Haaland");
        assert!(cache.get("other").await.is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_treated_as_absent_but_kept() {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = ResultCache::new(Duration::hours(1), clock.clone());

        cache.insert("239085", profile("Erling Haaland", clock.now())).await;
        clock.advance(Duration::hours(1) + Duration::seconds(1));

        assert!(cache.get("239085").await.is_none());
        assert_eq!(cache.len().await, 1);

        assert_eq!(cache.purge_stale().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_reinsert_refreshes_timestamp() {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = ResultCache::new(Duration::hours(1), clock.clone());

        cache.insert("1", profile("A", clock.now())).await;
        clock.advance(Duration::minutes(50));
        cache.insert("1", profile("A", clock.now())).await;
        clock.advance(Duration::minutes(50));

        assert!(cache.get("1").await.is_some());
    }
}
