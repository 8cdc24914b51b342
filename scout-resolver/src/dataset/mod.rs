//! Local reference dataset
//!
//! Built-in reference entries merged with a supplementary on-disk dataset,
//! keyed by normalized name. The on-disk dataset is loaded lazily on first
//! access and kept for the store's lifetime; a failed load degrades to the
//! built-in entries only.

pub mod builtin;
pub mod disk;

use crate::config::DatasetConfig;
use crate::matcher::SimilarityMatcher;
use crate::normalize::normalize_name;
use crate::types::{MatchCandidate, RatedPlayer};
use chrono::Datelike;
use scout_common::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Lookup table keyed by normalized name
pub type PlayerTable = BTreeMap<String, Arc<RatedPlayer>>;

/// Merged reference dataset
#[derive(Debug)]
pub struct LocalDatasetStore {
    builtin: Vec<RatedPlayer>,
    config: DatasetConfig,
    clock: Arc<dyn Clock>,
    table: OnceCell<PlayerTable>,
}

impl LocalDatasetStore {
    /// Store over the built-in reference table plus the configured disk paths
    pub fn new(config: DatasetConfig, clock: Arc<dyn Clock>) -> Self {
        let builtin = builtin::reference_players(|id, name| {
            reference_from_template(&config.reference_url_template, id, name)
        });
        Self::with_builtin(builtin, config, clock)
    }

    /// Store over caller-provided built-in entries
    pub fn with_builtin(builtin: Vec<RatedPlayer>, config: DatasetConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            builtin,
            config,
            clock,
            table: OnceCell::new(),
        }
    }

    /// Merged table, loading the disk dataset on first call
    pub async fn table(&self) -> &PlayerTable {
        self.table.get_or_init(|| self.build_table()).await
    }

    /// Exact lookup by normalized name
    pub async fn lookup_exact(&self, normalized: &str) -> Option<Arc<RatedPlayer>> {
        self.table().await.get(normalized).cloned()
    }

    /// Best fuzzy candidate for a normalized name
    pub async fn find_fuzzy(
        &self,
        normalized: &str,
        matcher: &SimilarityMatcher,
    ) -> Option<MatchCandidate> {
        matcher.best_match(normalized, self.table().await)
    }

    /// Number of entries after merging
    pub async fn len(&self) -> usize {
        self.table().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table().await.is_empty()
    }

    async fn build_table(&self) -> PlayerTable {
        let mut table = PlayerTable::new();
        for player in &self.builtin {
            insert(&mut table, player.clone());
        }
        let builtin_count = table.len();

        let current_year = self.clock.now().year();
        match disk::load_first(&self.config.paths, current_year).await {
            Ok((path, players)) => {
                let loaded = players.len();
                for mut player in players {
                    if player.reference.is_none() {
                        player.reference = player.external_id.as_deref().map(|id| {
                            reference_from_template(&self.config.reference_url_template, id, &player.name)
                        });
                    }
                    insert(&mut table, player);
                }
                info!(
                    path = %path.display(),
                    loaded,
                    builtin = builtin_count,
                    total = table.len(),
                    "Supplementary dataset merged"
                );
            }
            Err(e) => {
                warn!(
                    error = %e,
                    builtin = builtin_count,
                    "Supplementary dataset unavailable, using built-in entries only"
                );
            }
        }

        table
    }
}

/// Insert by normalized name; later entries overwrite earlier ones
fn insert(table: &mut PlayerTable, player: RatedPlayer) {
    let key = normalize_name(&player.name);
    if key.is_empty() {
        return;
    }
    table.insert(key, Arc::new(player));
}

/// URL-safe slug of a player name
pub fn slug(name: &str) -> String {
    normalize_name(name).replace(' ', "-")
}

/// Expand `{id}` and `{slug}` in a reference template
pub fn reference_from_template(template: &str, id: &str, name: &str) -> String {
    template.replace("{id}", id).replace("{slug}", &slug(name))
}
