//! Roster enrichment
//!
//! Pulls every player from an upstream directory and resolves each name
//! through a [`BatchResolver`]. Read-only: nothing is written back to the
//! directory.

use crate::batch::{BatchOutcome, BatchResolver, Resolve};
use crate::error::{ResolveError, ResolveResult};
use crate::types::{Query, Resolution, Source};
use async_trait::async_trait;
use scout_common::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// One roster row as the upstream directory stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Directory-local identifier (numeric or text upstream)
    #[serde(default, deserialize_with = "id_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub goals: Option<u32>,
}

fn id_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Upstream player store
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn fetch_all_players(&self) -> scout_common::Result<Vec<PlayerRecord>>;
}

/// Directory backed by a JSON array file
#[derive(Debug, Clone)]
pub struct JsonFileDirectory {
    path: PathBuf,
}

impl JsonFileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlayerDirectory for JsonFileDirectory {
    async fn fetch_all_players(&self) -> scout_common::Result<Vec<PlayerRecord>> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!("roster file {}", self.path.display())));
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&content).map_err(|e| {
            Error::InvalidInput(format!("roster file {}: {}", self.path.display(), e))
        })
    }
}

/// One roster row with its resolution outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub record: PlayerRecord,
    pub outcome: BatchOutcome,
}

/// Enriched roster plus tallies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterReport {
    pub entries: Vec<RosterEntry>,
    /// Rows that resolved to a profile (any tier)
    pub found: usize,
    /// Subset of `found` that needed fuzzy matching
    pub fuzzy: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl RosterReport {
    fn from_entries(entries: Vec<RosterEntry>) -> Self {
        let mut report = Self {
            entries: Vec::new(),
            found: 0,
            fuzzy: 0,
            not_found: 0,
            failed: 0,
        };

        for entry in &entries {
            match entry.outcome.resolution() {
                Some(resolution @ Resolution::Found { .. }) => {
                    report.found += 1;
                    if matches!(
                        resolution.source(),
                        Some(Source::DatabaseFuzzy | Source::DatabaseFuzzyFallback)
                    ) {
                        report.fuzzy += 1;
                    }
                }
                Some(Resolution::NotFound { .. }) => report.not_found += 1,
                None => report.failed += 1,
            }
        }

        report.entries = entries;
        report
    }
}

/// Resolve every directory record; per-row failures stay in the report
pub async fn enrich_roster<D, R>(
    directory: &D,
    batch: &BatchResolver<R>,
    allow_network: bool,
) -> ResolveResult<RosterReport>
where
    D: PlayerDirectory + ?Sized,
    R: Resolve,
{
    let records = directory
        .fetch_all_players()
        .await
        .map_err(|e| ResolveError::Directory(e.to_string()))?;

    let queries = records
        .iter()
        .map(|record| {
            let query = Query::new(record.name.clone());
            if allow_network {
                query.with_network()
            } else {
                query
            }
        })
        .collect();

    let outcomes = batch.resolve_all(queries).await;
    let entries = records
        .into_iter()
        .zip(outcomes)
        .map(|(record, outcome)| RosterEntry { record, outcome })
        .collect();

    let report = RosterReport::from_entries(entries);
    info!(
        rows = report.entries.len(),
        found = report.found,
        fuzzy = report.fuzzy,
        not_found = report.not_found,
        failed = report.failed,
        "Roster enriched"
    );
    Ok(report)
}
