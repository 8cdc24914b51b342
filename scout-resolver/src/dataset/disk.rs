//! On-disk dataset loading and field translation
//!
//! The file is a JSON array of records whose schema differs from
//! [`RatedPlayer`]: snake_case attribute names, comma-separated positions,
//! `age` as either an age or a birth year, and skills grouped by category.
//! Everything is translated through explicit name tables; anything missing
//! takes the documented default.

use crate::error::DatasetError;
use crate::types::{
    clamp_rating, default_skills, CoreAttributes, PhysicalAttributes, RatedPlayer,
    DEFAULT_PREFERRED_FOOT, DEFAULT_STAR_RATING, DEFAULT_WORK_RATE,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// `(source key, flat skill key)`; category names are ignored so grouped and
/// flat layouts translate the same way
const SKILL_KEY_MAP: &[(&str, &str)] = &[
    ("crossing", "crossing"),
    ("finishing", "finishing"),
    ("heading_accuracy", "heading_accuracy"),
    ("short_passing", "short_passing"),
    ("volleys", "volleys"),
    ("dribbling", "dribbling"),
    ("curve", "curve"),
    ("fk_accuracy", "free_kick_accuracy"),
    ("free_kick_accuracy", "free_kick_accuracy"),
    ("long_passing", "long_passing"),
    ("ball_control", "ball_control"),
    ("acceleration", "acceleration"),
    ("sprint_speed", "sprint_speed"),
    ("agility", "agility"),
    ("reactions", "reactions"),
    ("balance", "balance"),
    ("shot_power", "shot_power"),
    ("jumping", "jumping"),
    ("stamina", "stamina"),
    ("strength", "strength"),
    ("long_shots", "long_shots"),
    ("aggression", "aggression"),
    ("interceptions", "interceptions"),
    ("vision", "vision"),
    ("defensive_awareness", "marking"),
    ("marking", "marking"),
    ("standing_tackle", "standing_tackle"),
];

/// `(source key, core attribute)` for `main_attributes`
const CORE_KEY_MAP: &[(&str, &str)] = &[
    ("pace", "pace"),
    ("shooting", "shooting"),
    ("passing", "passing"),
    ("dribbling", "dribbling"),
    ("defending", "defending"),
    ("defense", "defending"),
    ("physical", "physical"),
    ("physic", "physical"),
];

/// Ages above this are read as a birth year
const BIRTH_YEAR_THRESHOLD: u32 = 200;

/// One record as stored on disk
#[derive(Debug, Deserialize)]
struct DiskRecord {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    #[serde(default)]
    age: Option<Value>,
    #[serde(default)]
    positions: Option<String>,
    #[serde(default)]
    height_cm: Option<Value>,
    #[serde(default)]
    weight_kg: Option<Value>,
    #[serde(default)]
    preferred_foot: Option<String>,
    #[serde(default)]
    weak_foot: Option<Value>,
    #[serde(default)]
    skill_moves: Option<Value>,
    #[serde(default)]
    work_rate: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    club: Option<String>,
    #[serde(default, alias = "overall_rating")]
    overall: Option<Value>,
    #[serde(default, alias = "potential_rating")]
    potential: Option<Value>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    main_attributes: Option<Map<String, Value>>,
    #[serde(default)]
    detailed_skills: Option<Map<String, Value>>,
}

/// Try each candidate path in order; the first file that parses as a JSON
/// array wins
///
/// Returns the path that loaded and its translated records.
pub async fn load_first(
    paths: &[PathBuf],
    current_year: i32,
) -> Result<(PathBuf, Vec<RatedPlayer>), DatasetError> {
    let mut last_error = DatasetError::NoCandidates;

    for path in paths {
        match load_file(path, current_year).await {
            Ok(players) => return Ok((path.clone(), players)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Dataset candidate rejected");
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Load and translate one dataset file
pub async fn load_file(path: &Path, current_year: i32) -> Result<Vec<RatedPlayer>, DatasetError> {
    let path_str = path.display().to_string();

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DatasetError::Io {
            path: path_str.clone(),
            source,
        })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| DatasetError::Json {
        path: path_str.clone(),
        source,
    })?;

    let Value::Array(records) = value else {
        return Err(DatasetError::Shape(path_str));
    };

    let mut players = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<DiskRecord>(record) {
            Ok(record) => players.push(translate(record, current_year)),
            Err(e) => warn!(path = %path_str, index, error = %e, "Skipping malformed dataset record"),
        }
    }

    Ok(players)
}

fn translate(record: DiskRecord, current_year: i32) -> RatedPlayer {
    let attributes = translate_core(record.main_attributes.as_ref());
    let skills = translate_skills(record.detailed_skills.as_ref());

    let overall = record
        .overall
        .as_ref()
        .and_then(rating_from_value)
        .unwrap_or_else(|| average_core(&attributes));
    let potential = record
        .potential
        .as_ref()
        .and_then(rating_from_value)
        .unwrap_or(overall)
        .max(overall);

    RatedPlayer {
        name: record.name.trim().to_string(),
        external_id: record.id.as_ref().and_then(id_from_value),
        reference: record.url.filter(|u| !u.trim().is_empty()),
        overall,
        potential,
        positions: record
            .positions
            .as_deref()
            .map(parse_positions)
            .unwrap_or_default(),
        club: record.club.filter(|c| !c.trim().is_empty()),
        nationality: record.nationality.filter(|n| !n.trim().is_empty()),
        physical: PhysicalAttributes {
            height_cm: record
                .height_cm
                .as_ref()
                .and_then(number_from_value)
                .and_then(|v| u16::try_from(v).ok()),
            weight_kg: record
                .weight_kg
                .as_ref()
                .and_then(number_from_value)
                .and_then(|v| u16::try_from(v).ok()),
            age: record
                .age
                .as_ref()
                .and_then(number_from_value)
                .and_then(|v| normalize_age(v, current_year)),
            preferred_foot: record
                .preferred_foot
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PREFERRED_FOOT.to_string()),
        },
        weak_foot: record
            .weak_foot
            .as_ref()
            .and_then(star_from_value)
            .unwrap_or(DEFAULT_STAR_RATING),
        skill_moves: record
            .skill_moves
            .as_ref()
            .and_then(star_from_value)
            .unwrap_or(DEFAULT_STAR_RATING),
        work_rate: record
            .work_rate
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WORK_RATE.to_string()),
        attributes,
        skills,
    }
}

fn translate_core(main: Option<&Map<String, Value>>) -> CoreAttributes {
    let mut core = CoreAttributes::default();
    let Some(main) = main else {
        return core;
    };

    for (source_key, target) in CORE_KEY_MAP {
        let Some(value) = main.get(*source_key).and_then(rating_from_value) else {
            continue;
        };
        match *target {
            "pace" => core.pace = value,
            "shooting" => core.shooting = value,
            "passing" => core.passing = value,
            "dribbling" => core.dribbling = value,
            "defending" => core.defending = value,
            "physical" => core.physical = value,
            _ => {}
        }
    }

    core
}

/// Flatten `detailed_skills` (grouped by category or already flat) into the
/// full skill map
fn translate_skills(detailed: Option<&Map<String, Value>>) -> BTreeMap<String, u8> {
    let mut skills = default_skills();
    let Some(detailed) = detailed else {
        return skills;
    };

    let mut flat: Vec<(&String, &Value)> = Vec::new();
    for (key, value) in detailed {
        match value {
            Value::Object(group) => flat.extend(group.iter()),
            other => flat.push((key, other)),
        }
    }

    for (source_key, value) in flat {
        let Some((_, target)) = SKILL_KEY_MAP
            .iter()
            .find(|(k, _)| *k == source_key.as_str())
        else {
            continue;
        };
        if let Some(rating) = rating_from_value(value) {
            skills.insert(target.to_string(), rating);
        }
    }

    skills
}

fn average_core(core: &CoreAttributes) -> u8 {
    let sum: u32 = [
        core.pace,
        core.shooting,
        core.passing,
        core.dribbling,
        core.defending,
        core.physical,
    ]
    .iter()
    .map(|v| *v as u32)
    .sum();
    (sum as f64 / 6.0).round() as u8
}

/// Split a comma-separated position list
pub fn parse_positions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Age as-is, or derived from a birth year
pub fn normalize_age(raw: u32, current_year: i32) -> Option<u8> {
    if raw > BIRTH_YEAR_THRESHOLD {
        let age = current_year - raw as i32;
        (0..=u8::MAX as i32).contains(&age).then_some(age as u8)
    } else {
        u8::try_from(raw).ok()
    }
}

fn number_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f.round() as u32),
        _ => None,
    }
}

fn rating_from_value(value: &Value) -> Option<u8> {
    number_from_value(value).map(|v| clamp_rating(v.min(99) as u8))
}

fn star_from_value(value: &Value) -> Option<u8> {
    number_from_value(value).map(|v| v.clamp(1, 5) as u8)
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_SKILL_RATING, SKILL_NAMES};
    use serde_json::json;

    fn record(value: Value) -> RatedPlayer {
        translate(serde_json::from_value(value).unwrap(), 2024)
    }

    #[test]
    fn test_translate_full_record() {
        let player = record(json!({
            "id": 239085,
            "name": "Erling Haaland",
            "age": 2000,
            "positions": "ST, cf",
            "height_cm": 195,
            "weight_kg": 94,
            "preferred_foot": "Left",
            "weak_foot": 3,
            "skill_moves": 3,
            "work_rate": "High/Medium",
            "nationality": "Norway",
            "overall_rating": 91,
            "main_attributes": {
                "pace": 89, "shooting": 93, "passing": 66,
                "dribbling": 80, "defending": 45, "physical": 88
            },
            "detailed_skills": {
                "attacking": { "finishing": 96, "crossing": 55 },
                "skill": { "fk_accuracy": 65 },
                "defending": { "defensive_awareness": 38, "sliding_tackle": 40 }
            }
        }));

        assert_eq!(player.external_id.as_deref(), Some("239085"));
        assert_eq!(player.physical.age, Some(24));
        assert_eq!(player.positions, vec!["ST", "CF"]);
        assert_eq!(player.overall, 91);
        assert_eq!(player.potential, 91);
        assert_eq!(player.attributes.shooting, 93);
        assert_eq!(player.skills["finishing"], 96);
        assert_eq!(player.skills["free_kick_accuracy"], 65);
        assert_eq!(player.skills["marking"], 38);
        assert!(!player.skills.contains_key("sliding_tackle"));
        assert_eq!(player.skills["vision"], DEFAULT_SKILL_RATING);
        assert_eq!(player.skills.len(), SKILL_NAMES.len());
    }

    #[test]
    fn test_translate_sparse_record_uses_defaults() {
        let player = record(json!({ "name": "Unknown Prospect" }));

        assert_eq!(player.weak_foot, 3);
        assert_eq!(player.skill_moves, 3);
        assert_eq!(player.work_rate, "Medium/Medium");
        assert_eq!(player.physical.preferred_foot, "Right");
        assert_eq!(player.attributes, CoreAttributes::default());
        assert_eq!(player.overall, DEFAULT_SKILL_RATING);
        assert!(player.skills.values().all(|v| *v == DEFAULT_SKILL_RATING));
        assert!(player.positions.is_empty());
    }

    #[test]
    fn test_age_forms() {
        assert_eq!(normalize_age(27, 2024), Some(27));
        assert_eq!(normalize_age(1998, 2024), Some(26));
        assert_eq!(normalize_age(3000, 2024), None);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let player = record(json!({
            "name": "String Numbers",
            "id": "abc-1",
            "age": "25",
            "main_attributes": { "pace": "81" }
        }));
        assert_eq!(player.external_id.as_deref(), Some("abc-1"));
        assert_eq!(player.physical.age, Some(25));
        assert_eq!(player.attributes.pace, 81);
    }

    #[test]
    fn test_parse_positions_drops_empty() {
        assert_eq!(parse_positions("lw, ,st,"), vec!["LW", "ST"]);
        assert!(parse_positions("").is_empty());
    }

    #[test]
    fn test_out_of_range_physicals_dropped() {
        let player = record(json!({
            "name": "Tall Tale",
            "height_cm": 70000,
            "weight_kg": 82
        }));
        assert_eq!(player.physical.height_cm, None);
        assert_eq!(player.physical.weight_kg, Some(82));
    }

    #[tokio::test]
    async fn test_malformed_record_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("players.json");
        std::fs::write(
            &path,
            r#"[{"name": "Kept Player", "overall": 77}, {"overall": 80}, "not a record"]"#,
        )
        .unwrap();

        let players = load_file(&path, 2024).await.unwrap();

        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Kept Player");
        assert_eq!(players[0].overall, 77);
    }

    #[tokio::test]
    async fn test_non_array_file_is_shape_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("players.json");
        std::fs::write(&path, r#"{"name": "Not An Array"}"#).unwrap();

        let result = load_file(&path, 2024).await;
        assert!(matches!(result, Err(DatasetError::Shape(p)) if p.ends_with("players.json")));
    }
}
