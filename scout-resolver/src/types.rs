//! Core types for player identity resolution
//!
//! Defines the data contracts between pipeline stages:
//! - **Input:** [`Query`] (free-text name + resolution options)
//! - **Dataset:** [`RatedPlayer`] (one reference entry, all ratings present)
//! - **Fetch:** [`PartialProfile`] (best-effort fields from a live page)
//! - **Output:** [`Resolution`] wrapping a [`CanonicalProfile`] tagged with provenance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Rating used for any sub-skill missing from a source record
pub const DEFAULT_SKILL_RATING: u8 = 65;
/// Default weak foot / skill moves star rating
pub const DEFAULT_STAR_RATING: u8 = 3;
/// Default work rate
pub const DEFAULT_WORK_RATE: &str = "Medium/Medium";
/// Default preferred foot
pub const DEFAULT_PREFERRED_FOOT: &str = "Right";

/// Flat skill map keys carried by every profile
pub const SKILL_NAMES: [&str; 25] = [
    "crossing",
    "finishing",
    "heading_accuracy",
    "short_passing",
    "volleys",
    "dribbling",
    "curve",
    "free_kick_accuracy",
    "long_passing",
    "ball_control",
    "acceleration",
    "sprint_speed",
    "agility",
    "reactions",
    "balance",
    "shot_power",
    "jumping",
    "stamina",
    "strength",
    "long_shots",
    "aggression",
    "interceptions",
    "vision",
    "marking",
    "standing_tackle",
];

// ============================================================================
// Query
// ============================================================================

/// Resolution options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Permit the live fetch chain
    pub allow_network: bool,
    /// Known stable identifier (external player id)
    pub stable_id: Option<String>,
}

/// Free-text name plus resolution options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub options: ResolveOptions,
}

impl Query {
    /// Local-only query
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: ResolveOptions::default(),
        }
    }

    /// Permit live enrichment
    pub fn with_network(mut self) -> Self {
        self.options.allow_network = true;
        self
    }

    /// Attach a known stable identifier
    pub fn with_stable_id(mut self, id: impl Into<String>) -> Self {
        self.options.stable_id = Some(id.into());
        self
    }
}

// ============================================================================
// Profile
// ============================================================================

/// The six summary ratings (0-99)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreAttributes {
    pub pace: u8,
    pub shooting: u8,
    pub passing: u8,
    pub dribbling: u8,
    pub defending: u8,
    pub physical: u8,
}

impl CoreAttributes {
    pub fn new(
        pace: u8,
        shooting: u8,
        passing: u8,
        dribbling: u8,
        defending: u8,
        physical: u8,
    ) -> Self {
        Self {
            pace: clamp_rating(pace),
            shooting: clamp_rating(shooting),
            passing: clamp_rating(passing),
            dribbling: clamp_rating(dribbling),
            defending: clamp_rating(defending),
            physical: clamp_rating(physical),
        }
    }
}

impl Default for CoreAttributes {
    fn default() -> Self {
        let r = DEFAULT_SKILL_RATING;
        Self::new(r, r, r, r, r, r)
    }
}

/// Physical metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalAttributes {
    pub height_cm: Option<u16>,
    pub weight_kg: Option<u16>,
    pub age: Option<u8>,
    pub preferred_foot: String,
}

impl Default for PhysicalAttributes {
    fn default() -> Self {
        Self {
            height_cm: None,
            weight_kg: None,
            age: None,
            preferred_foot: DEFAULT_PREFERRED_FOOT.to_string(),
        }
    }
}

/// One reference dataset entry
///
/// Core attributes and every key in [`SKILL_NAMES`] are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedPlayer {
    pub name: String,
    /// Stable external identifier
    pub external_id: Option<String>,
    /// External reference (player page URL) used by the live fetch chain
    pub reference: Option<String>,
    pub overall: u8,
    pub potential: u8,
    pub positions: Vec<String>,
    pub club: Option<String>,
    pub nationality: Option<String>,
    pub physical: PhysicalAttributes,
    pub weak_foot: u8,
    pub skill_moves: u8,
    pub work_rate: String,
    pub attributes: CoreAttributes,
    pub skills: BTreeMap<String, u8>,
}

impl RatedPlayer {
    /// Entry with every rating defaulted
    pub fn with_defaults(name: impl Into<String>, overall: u8) -> Self {
        let overall = clamp_rating(overall);
        Self {
            name: name.into(),
            external_id: None,
            reference: None,
            overall,
            potential: overall,
            positions: Vec::new(),
            club: None,
            nationality: None,
            physical: PhysicalAttributes::default(),
            weak_foot: DEFAULT_STAR_RATING,
            skill_moves: DEFAULT_STAR_RATING,
            work_rate: DEFAULT_WORK_RATE.to_string(),
            attributes: CoreAttributes::default(),
            skills: default_skills(),
        }
    }

    /// Overlay fetched fields; fetched values win on conflict
    pub fn merge_partial(&mut self, partial: &PartialProfile) {
        if let Some(name) = &partial.name {
            self.name = name.clone();
        }
        if let Some(overall) = partial.overall {
            self.overall = clamp_rating(overall);
        }
        if let Some(potential) = partial.potential {
            self.potential = clamp_rating(potential);
        }
        if let Some(positions) = &partial.positions {
            if !positions.is_empty() {
                self.positions = positions.clone();
            }
        }
        if let Some(age) = partial.age {
            self.physical.age = Some(age);
        }
        if let Some(club) = &partial.club {
            self.club = Some(club.clone());
        }
        if let Some(nationality) = &partial.nationality {
            self.nationality = Some(nationality.clone());
        }
        if let Some(id) = &partial.external_id {
            self.external_id = Some(id.clone());
        }
    }
}

/// Which tier produced a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    Database,
    DatabaseFuzzy,
    LiveEnhanced,
    DatabaseFallback,
    DatabaseFuzzyFallback,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Database => "database",
            Self::DatabaseFuzzy => "database_fuzzy",
            Self::LiveEnhanced => "live_enhanced",
            Self::DatabaseFallback => "database_fallback",
            Self::DatabaseFuzzyFallback => "database_fuzzy_fallback",
        }
    }

    /// Fallback variant of a dataset tier
    pub fn fallback(self) -> Self {
        match self {
            Self::Database => Self::DatabaseFallback,
            Self::DatabaseFuzzy => Self::DatabaseFuzzyFallback,
            other => other,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance metadata stamped on every returned profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: Source,
    pub resolved_at: DateTime<Utc>,
}

/// Resolved player profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProfile {
    #[serde(flatten)]
    pub player: RatedPlayer,
    pub provenance: Provenance,
}

impl CanonicalProfile {
    pub fn new(player: RatedPlayer, source: Source, resolved_at: DateTime<Utc>) -> Self {
        Self {
            player,
            provenance: Provenance {
                source,
                resolved_at,
            },
        }
    }

    pub fn source(&self) -> Source {
        self.provenance.source
    }
}

/// Best-effort fields recovered from a fetched page
///
/// Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialProfile {
    pub name: Option<String>,
    pub overall: Option<u8>,
    pub potential: Option<u8>,
    pub positions: Option<Vec<String>>,
    pub age: Option<u8>,
    pub club: Option<String>,
    pub nationality: Option<String>,
    pub external_id: Option<String>,
}

impl PartialProfile {
    /// A partial profile counts only if it recovered an overall rating or a name
    pub fn is_meaningful(&self) -> bool {
        self.overall.is_some() || self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

// ============================================================================
// Matching and results
// ============================================================================

/// Fuzzy search candidate (ephemeral)
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    /// Canonical (normalized) dataset key
    pub name: String,
    pub player: Arc<RatedPlayer>,
    pub score: f64,
    pub matched_terms: usize,
}

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found {
        /// Original query text
        query: String,
        profile: CanonicalProfile,
        /// Canonical name matched when the fuzzy tier was used
        matched_name: Option<String>,
        /// Why live enrichment did not apply, for fallback tiers
        fallback_reason: Option<String>,
    },
    NotFound {
        query: String,
    },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn profile(&self) -> Option<&CanonicalProfile> {
        match self {
            Self::Found { profile, .. } => Some(profile),
            Self::NotFound { .. } => None,
        }
    }

    pub fn source(&self) -> Option<Source> {
        self.profile().map(CanonicalProfile::source)
    }

    pub fn query(&self) -> &str {
        match self {
            Self::Found { query, .. } | Self::NotFound { query } => query,
        }
    }
}

/// Clamp a rating into 0-99
pub fn clamp_rating(value: u8) -> u8 {
    value.min(99)
}

/// Skill map with every key at the default rating
pub fn default_skills() -> BTreeMap<String, u8> {
    SKILL_NAMES
        .iter()
        .map(|name| (name.to_string(), DEFAULT_SKILL_RATING))
        .collect()
}
