//! Markup extraction
//!
//! Turns fetched content (a JSON profile or an HTML player page) into a
//! [`PartialProfile`]. Every field is extracted independently; a missing
//! field never fails the extraction. The result counts only if it carries an
//! overall rating or a name.

use crate::dataset::disk::parse_positions;
use crate::types::{clamp_rating, PartialProfile};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

/// Pluggable content parser
pub trait MarkupExtractor: Send + Sync {
    /// Best-effort partial profile, or `None` if nothing meaningful was found
    fn extract(&self, content: &str) -> Option<PartialProfile>;
}

/// Default extractor for JSON profiles and HTML player pages
#[derive(Debug, Default, Clone, Copy)]
pub struct PageExtractor;

impl MarkupExtractor for PageExtractor {
    fn extract(&self, content: &str) -> Option<PartialProfile> {
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            return None;
        }

        let partial = if trimmed.starts_with('{') {
            extract_json(trimmed)?
        } else {
            extract_html(content)
        };

        partial.is_meaningful().then_some(partial)
    }
}

// ============================================================================
// JSON
// ============================================================================

const NAME_KEYS: &[&str] = &["name", "display_name", "player_name", "short_name", "long_name"];
const OVERALL_KEYS: &[&str] = &["overall", "overall_rating", "rating", "ovr"];
const POTENTIAL_KEYS: &[&str] = &["potential", "potential_rating", "pot"];
const POSITION_KEYS: &[&str] = &["positions", "position", "player_positions"];
const AGE_KEYS: &[&str] = &["age"];
const CLUB_KEYS: &[&str] = &["club", "team", "club_name"];
const NATIONALITY_KEYS: &[&str] = &["nationality", "nation", "country", "nationality_name"];
const ID_KEYS: &[&str] = &["id", "player_id", "sofifa_id"];

fn extract_json(content: &str) -> Option<PartialProfile> {
    let value: Value = serde_json::from_str(content).ok()?;
    let Value::Object(mut object) = value else {
        return None;
    };

    // Some endpoints nest the profile one level down
    for wrapper in ["player", "data", "profile"] {
        if let Some(Value::Object(inner)) = object.get(wrapper) {
            object = inner.clone();
            break;
        }
    }

    Some(PartialProfile {
        name: first_string(&object, NAME_KEYS),
        overall: first_number(&object, OVERALL_KEYS).map(rating),
        potential: first_number(&object, POTENTIAL_KEYS).map(rating),
        positions: first_positions(&object),
        age: first_number(&object, AGE_KEYS).and_then(|a| u8::try_from(a).ok()),
        club: first_string(&object, CLUB_KEYS),
        nationality: first_string(&object, NATIONALITY_KEYS),
        external_id: ID_KEYS.iter().find_map(|k| match object.get(*k)? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }),
    })
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        object
            .get(*k)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| match object.get(*k)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn first_positions(object: &Map<String, Value>) -> Option<Vec<String>> {
    POSITION_KEYS.iter().find_map(|k| {
        let positions = match object.get(*k)? {
            Value::String(s) => parse_positions(s),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .flat_map(parse_positions)
                .collect(),
            _ => return None,
        };
        (!positions.is_empty()).then_some(positions)
    })
}

fn rating(value: u64) -> u8 {
    clamp_rating(value.min(99) as u8)
}

// ============================================================================
// HTML
// ============================================================================

// Selector and pattern strings are compile-time constants; parsing cannot fail.
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static OVERALL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[data-stat="overall"], .overall, .rating-overall"#).unwrap()
});
static POTENTIAL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[data-stat="potential"], .potential, .rating-potential"#).unwrap()
});
static POSITION: Lazy<Selector> = Lazy::new(|| Selector::parse("span.pos, .position").unwrap());
static CLUB: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[href*="/team/"]"#).unwrap());
static NATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="na="], img.flag"#).unwrap());
static CANONICAL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical"]"#).unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static POSITION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2,3}$").unwrap());
static AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{2})\s*y\.?o\.?|\bage\s*:?\s*(\d{2})\b").unwrap());
static OVERALL_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)overall\s+rating\s*:?\s*(\d{2})").unwrap());
static POTENTIAL_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)potential\s*:?\s*(\d{2})").unwrap());
static PLAYER_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/player/(\d+)").unwrap());
static TITLE_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(?:[-|]\s|FC \d{2}\b|FIFA \d{2}\b).*$").unwrap());

fn extract_html(content: &str) -> PartialProfile {
    let document = Html::parse_document(content);
    let body_text = document
        .select(&BODY)
        .next()
        .map(|b| collapse(&b.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default();

    PartialProfile {
        name: html_name(&document),
        overall: html_rating(&document, &OVERALL).or_else(|| text_rating(&body_text, &OVERALL_TEXT_RE)),
        potential: html_rating(&document, &POTENTIAL)
            .or_else(|| text_rating(&body_text, &POTENTIAL_TEXT_RE)),
        positions: html_positions(&document),
        age: AGE_RE.captures(&body_text).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .and_then(|m| m.as_str().parse().ok())
        }),
        club: document
            .select(&CLUB)
            .map(|a| collapse(&a.text().collect::<String>()))
            .find(|s| !s.is_empty()),
        nationality: document.select(&NATION).find_map(|el| {
            el.value()
                .attr("title")
                .map(str::to_string)
                .or_else(|| Some(collapse(&el.text().collect::<String>())))
                .filter(|s| !s.trim().is_empty())
        }),
        external_id: document
            .select(&CANONICAL)
            .filter_map(|l| l.value().attr("href"))
            .find_map(|href| PLAYER_ID_RE.captures(href))
            .map(|c| c[1].to_string()),
    }
}

fn html_name(document: &Html) -> Option<String> {
    let from_meta = document
        .select(&OG_TITLE)
        .filter_map(|m| m.value().attr("content"))
        .map(|t| TITLE_SUFFIX_RE.replace(t, "").trim().to_string())
        .find(|t| !t.is_empty());

    from_meta.or_else(|| {
        document
            .select(&HEADING)
            .map(|h| collapse(&h.text().collect::<String>()))
            .find(|t| !t.is_empty())
    })
}

fn html_rating(document: &Html, selector: &Selector) -> Option<u8> {
    document.select(selector).find_map(|el| {
        let text = el.text().collect::<String>();
        NUMBER_RE
            .find(&text)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .filter(|v| *v <= 99)
            .map(rating)
    })
}

fn text_rating(text: &str, pattern: &Regex) -> Option<u8> {
    pattern
        .captures(text)
        .and_then(|c| c[1].parse::<u64>().ok())
        .map(rating)
}

fn html_positions(document: &Html) -> Option<Vec<String>> {
    let mut positions: Vec<String> = Vec::new();
    for el in document.select(&POSITION) {
        let text = collapse(&el.text().collect::<String>()).to_uppercase();
        if POSITION_RE.is_match(&text) && !positions.contains(&text) {
            positions.push(text);
        }
    }
    (!positions.is_empty()).then_some(positions)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
