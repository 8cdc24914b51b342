//! Fuzzy player name matching
//!
//! Scores a normalized query against normalized dataset keys term by term:
//! exact term equality, substring containment, then Levenshtein similarity.
//! All thresholds come from [`MatchingConfig`].

use crate::config::MatchingConfig;
use crate::normalize::{normalize_name, terms};
use crate::types::{MatchCandidate, RatedPlayer};
use std::sync::Arc;
use tracing::debug;

/// Levenshtein distance (unit insert/delete/substitute cost)
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Aggregate score of one query/candidate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameScore {
    pub score: f64,
    /// Query terms whose best score exceeded the per-term minimum
    pub matched_terms: usize,
}

impl NameScore {
    const NONE: NameScore = NameScore {
        score: 0.0,
        matched_terms: 0,
    };
}

/// Similarity matcher over normalized names
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatcher {
    config: MatchingConfig,
}

impl SimilarityMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Score one query term against one candidate term
    pub fn term_similarity(&self, query_term: &str, candidate_term: &str) -> f64 {
        if query_term == candidate_term {
            return 1.0;
        }

        let q_len = query_term.chars().count();
        let c_len = candidate_term.chars().count();
        let max_len = q_len.max(c_len);
        if max_len == 0 {
            return 0.0;
        }

        if candidate_term.contains(query_term) || query_term.contains(candidate_term) {
            let min_len = q_len.min(c_len);
            return min_len as f64 / max_len as f64 * self.config.containment_weight;
        }

        let distance = edit_distance(query_term, candidate_term);
        let similarity = (max_len - distance.min(max_len)) as f64 / max_len as f64;
        if similarity > self.config.edit_min_similarity {
            similarity * self.config.edit_weight
        } else {
            0.0
        }
    }

    /// Score a normalized query against a normalized candidate
    pub fn score(&self, query: &str, candidate: &str) -> NameScore {
        let query_terms = terms(query);
        if query == candidate {
            return NameScore {
                score: 1.0,
                matched_terms: query_terms.len(),
            };
        }

        let candidate_terms = terms(candidate);
        if query_terms.is_empty() || candidate_terms.is_empty() {
            return NameScore::NONE;
        }

        let mut total = 0.0;
        let mut matched_terms = 0;
        for q in &query_terms {
            let best = candidate_terms
                .iter()
                .map(|c| self.term_similarity(q, c))
                .fold(0.0_f64, f64::max);
            if best > self.config.term_min_score {
                total += best;
                matched_terms += 1;
            }
        }

        let mut score = total / query_terms.len() as f64;

        // Bare surname queries: boost by how completely the term is contained
        // in some candidate term, up to `single_term_boost`.
        if query_terms.len() == 1 && score > 0.0 {
            let q = query_terms[0];
            let q_len = q.chars().count();
            let containment = candidate_terms
                .iter()
                .filter(|c| c.contains(q) || q.contains(**c))
                .map(|c| {
                    let c_len = c.chars().count();
                    q_len.min(c_len) as f64 / q_len.max(c_len) as f64
                })
                .fold(0.0_f64, f64::max);
            score *= 1.0 + (self.config.single_term_boost - 1.0) * containment;
        }

        NameScore {
            score,
            matched_terms,
        }
    }

    /// Normalize both names, then score
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        self.score(&normalize_name(a), &normalize_name(b)).score
    }

    /// Acceptance rule: strong score, or broad term coverage with a fair score
    pub fn is_accepted(&self, score: &NameScore, query_term_count: usize) -> bool {
        if score.score > self.config.accept_score {
            return true;
        }
        let required = (self.config.coverage_ratio * query_term_count as f64).ceil() as usize;
        score.matched_terms >= required.max(1) && score.score > self.config.coverage_min_score
    }

    /// Best accepted candidate among `(canonical key, entry)` pairs
    ///
    /// Scores within `tie_margin` of each other are ranked by contributing
    /// term count first.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<MatchCandidate>
    where
        I: IntoIterator<Item = (&'a String, &'a Arc<RatedPlayer>)>,
    {
        let query_term_count = terms(query).len();
        if query_term_count == 0 {
            return None;
        }

        let mut best: Option<MatchCandidate> = None;
        for (key, player) in candidates {
            let scored = self.score(query, key);
            if !self.is_accepted(&scored, query_term_count) {
                continue;
            }

            let candidate = MatchCandidate {
                name: key.clone(),
                player: Arc::clone(player),
                score: scored.score,
                matched_terms: scored.matched_terms,
            };

            best = match best {
                None => Some(candidate),
                Some(current) if self.outranks(&candidate, &current) => Some(candidate),
                keep => keep,
            };
        }

        if let Some(found) = &best {
            debug!(
                query = %query,
                matched = %found.name,
                score = found.score,
                matched_terms = found.matched_terms,
                "Fuzzy match accepted"
            );
        }

        best
    }

    fn outranks(&self, challenger: &MatchCandidate, current: &MatchCandidate) -> bool {
        let delta = challenger.score - current.score;
        if delta.abs() <= self.config.tie_margin {
            if challenger.matched_terms != current.matched_terms {
                return challenger.matched_terms > current.matched_terms;
            }
            return delta > 0.0;
        }
        delta > 0.0
    }
}
