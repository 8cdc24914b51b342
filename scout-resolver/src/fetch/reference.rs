//! Reference-parsing strategy
//!
//! Network-free last resort: recovers an identifier and a display name from
//! the structure of the reference (`.../player/{id}/{slug}/...`).

use super::{FetchStrategy, FetchTarget};
use crate::error::FetchError;
use crate::types::PartialProfile;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

static PLAYER_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/player/(\d+)(?:/([A-Za-z][A-Za-z0-9-]*))?").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceStrategy;

#[async_trait]
impl FetchStrategy for ReferenceStrategy {
    fn name(&self) -> &str {
        "reference"
    }

    async fn attempt(&self, target: &FetchTarget) -> Result<Option<PartialProfile>, FetchError> {
        Ok(parse_reference(target))
    }
}

/// Minimal profile from the reference structure, if it carries one
pub fn parse_reference(target: &FetchTarget) -> Option<PartialProfile> {
    let captures = PLAYER_PATH_RE.captures(&target.reference)?;
    let id = captures[1].to_string();

    // A known name beats a lossy slug
    let name = target
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| captures.get(2).map(|slug| title_from_slug(slug.as_str())));

    let partial = PartialProfile {
        name,
        external_id: Some(id),
        ..PartialProfile::default()
    };
    partial.is_meaningful().then_some(partial)
}

/// `erling-haaland` -> `Erling Haaland`
fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_and_slug() {
        let partial =
            parse_reference(&FetchTarget::new("https://sofifa.com/player/239085/erling-haaland/"))
                .unwrap();
        assert_eq!(partial.name.as_deref(), Some("Erling Haaland"));
        assert_eq!(partial.external_id.as_deref(), Some("239085"));
        assert!(partial.overall.is_none());
    }

    #[test]
    fn test_known_name_wins_over_slug() {
        let target = FetchTarget {
            reference: "https://sofifa.com/player/231747/kylian-mbappe/".to_string(),
            stable_id: None,
            name: Some("Kylian Mbappé".to_string()),
        };
        assert_eq!(
            parse_reference(&target).unwrap().name.as_deref(),
            Some("Kylian Mbappé")
        );
    }

    #[test]
    fn test_id_without_slug_or_name_is_no_data() {
        assert!(parse_reference(&FetchTarget::new("https://sofifa.com/player/239085/")).is_none());
        assert!(parse_reference(&FetchTarget::new("https://sofifa.com/team/10/")).is_none());
    }

    #[tokio::test]
    async fn test_strategy_never_fails() {
        let result = ReferenceStrategy.attempt(&FetchTarget::new("not a url")).await;
        assert!(matches!(result, Ok(None)));
    }
}
