//! Resolver configuration
//!
//! Every tuning constant of the pipeline is a named, overridable field here.
//! Loading goes through [`scout_common::config::load_toml_config`]; every
//! section is `#[serde(default)]` so partial files are valid.

use scout_common::config::{env_override, load_toml_config, resolve_config_path, LoggingConfig};
use scout_common::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Config file name under the platform config dir
pub const CONFIG_FILE_NAME: &str = "resolver.toml";
/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SCOUT_CONFIG";
/// Environment variable prepended to the dataset candidate paths
pub const DATASET_PATH_ENV_VAR: &str = "SCOUT_DATASET_PATH";
/// Environment variable setting the own-server relay endpoint
pub const OWN_SERVER_ENV_VAR: &str = "SCOUT_OWN_SERVER_URL";

/// Complete resolver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub matching: MatchingConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub batch: BatchConfig,
    pub dataset: DatasetConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

impl ResolverConfig {
    /// Load configuration using the CLI → ENV → platform dir priority,
    /// then apply environment overrides
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME);
        let mut config: ResolverConfig = load_toml_config(path.as_deref())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SCOUT_DATASET_PATH` and `SCOUT_OWN_SERVER_URL`
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = env_override(DATASET_PATH_ENV_VAR) {
            info!(path = %path, "Dataset path overridden from environment");
            self.dataset.paths.insert(0, PathBuf::from(path));
        }
        if let Some(url) = env_override(OWN_SERVER_ENV_VAR) {
            info!(url = %url, "Own-server relay endpoint set from environment");
            self.fetch.own_server_url = Some(url);
        }
    }
}

/// Fuzzy name matching thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Aggregate score above which a candidate is accepted outright
    pub accept_score: f64,
    /// Fraction of query terms that must contribute for coverage acceptance
    pub coverage_ratio: f64,
    /// Minimum aggregate score for coverage acceptance
    pub coverage_min_score: f64,
    /// Minimum per-term score for a term to contribute
    pub term_min_score: f64,
    /// Weight applied to substring-containment term scores
    pub containment_weight: f64,
    /// Minimum normalized edit similarity for an edit-distance term score
    pub edit_min_similarity: f64,
    /// Weight applied to edit-distance term scores
    pub edit_weight: f64,
    /// Maximum multiplier for confident single-term (surname) queries
    pub single_term_boost: f64,
    /// Scores within this margin are tied; more contributing terms wins
    pub tie_margin: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            accept_score: 0.6,
            coverage_ratio: 0.7,
            coverage_min_score: 0.4,
            term_min_score: 0.5,
            containment_weight: 0.9,
            edit_min_similarity: 0.6,
            edit_weight: 0.8,
            single_term_boost: 1.2,
            tie_margin: 0.1,
        }
    }
}

/// Result cache freshness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs as i64)
    }
}

/// Fixed-window limit on outbound fetch attempts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

/// Batch wave sizing and pacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub size: usize,
    pub delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: 3,
            delay_ms: 1000,
        }
    }
}

impl BatchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Supplementary on-disk dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Candidate paths, tried in order
    pub paths: Vec<PathBuf>,
    /// Template for deriving an external reference from a record
    /// (`{id}` and `{slug}` placeholders)
    pub reference_url_template: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("data/players.json"),
                PathBuf::from("./players.json"),
                PathBuf::from("../data/players.json"),
            ],
            reference_url_template: "https://sofifa.com/player/{id}/{slug}/".to_string(),
        }
    }
}

/// How a relay wraps the fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    /// Body is the page itself
    Raw,
    /// Body is `{"contents": "<page>", ...}`
    JsonContents,
}

/// One third-party relay endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub name: String,
    /// URL with a `{url}` placeholder receiving the percent-encoded target
    pub url_template: String,
    pub envelope: Envelope,
}

/// Live fetch chain settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout
    pub timeout_secs: u64,
    pub user_agent: String,
    pub relays: Vec<RelayConfig>,
    /// First-party relay endpoint; absent means the strategy is unavailable
    pub own_server_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("scout-resolver/", env!("CARGO_PKG_VERSION")).to_string(),
            relays: vec![
                RelayConfig {
                    name: "allorigins".to_string(),
                    url_template: "https://api.allorigins.win/get?url={url}".to_string(),
                    envelope: Envelope::JsonContents,
                },
                RelayConfig {
                    name: "corsproxy".to_string(),
                    url_template: "https://corsproxy.io/?{url}".to_string(),
                    envelope: Envelope::Raw,
                },
            ],
            own_server_url: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
