//! Built-in reference ratings
//!
//! Skill arrays follow [`SKILL_NAMES`] order.

use crate::types::{CoreAttributes, PhysicalAttributes, RatedPlayer, SKILL_NAMES};

struct ReferenceEntry {
    id: &'static str,
    name: &'static str,
    overall: u8,
    potential: u8,
    positions: &'static [&'static str],
    club: &'static str,
    nationality: &'static str,
    /// (height cm, weight kg, age, preferred foot)
    physical: (u16, u16, u8, &'static str),
    /// (weak foot, skill moves, work rate)
    style: (u8, u8, &'static str),
    /// pace, shooting, passing, dribbling, defending, physical
    core: [u8; 6],
    skills: [u8; 25],
}

const REFERENCE: &[ReferenceEntry] = &[
    ReferenceEntry {
        id: "239085",
        name: "Erling Haaland",
        overall: 91,
        potential: 94,
        positions: &["ST"],
        club: "Manchester City",
        nationality: "Norway",
        physical: (195, 94, 23, "Left"),
        style: (3, 3, "High/Medium"),
        core: [89, 93, 66, 80, 45, 88],
        skills: [
            55, 96, 85, 79, 90, 80, 77, 65, 59, 84, 87, 94, 77, 96, 70, 94, 93, 77, 93, 84, 87,
            43, 73, 38, 47,
        ],
    },
    ReferenceEntry {
        id: "231747",
        name: "Kylian Mbappé",
        overall: 91,
        potential: 94,
        positions: &["ST", "LW"],
        club: "Real Madrid",
        nationality: "France",
        physical: (182, 75, 25, "Right"),
        style: (4, 5, "High/Low"),
        core: [97, 90, 80, 92, 36, 78],
        skills: [
            80, 94, 78, 85, 84, 93, 80, 69, 71, 92, 97, 97, 93, 93, 81, 90, 78, 88, 77, 83, 64,
            38, 83, 26, 34,
        ],
    },
    ReferenceEntry {
        id: "158023",
        name: "Lionel Messi",
        overall: 90,
        potential: 90,
        positions: &["CF", "RW"],
        club: "Inter Miami",
        nationality: "Argentina",
        physical: (169, 67, 36, "Left"),
        style: (4, 4, "Low/Low"),
        core: [80, 87, 90, 94, 33, 64],
        skills: [
            81, 89, 66, 91, 87, 94, 93, 90, 91, 93, 83, 70, 91, 92, 95, 86, 68, 70, 68, 91, 44,
            40, 94, 20, 35,
        ],
    },
    ReferenceEntry {
        id: "192985",
        name: "Kevin De Bruyne",
        overall: 91,
        potential: 91,
        positions: &["CM", "CAM"],
        club: "Manchester City",
        nationality: "Belgium",
        physical: (181, 70, 32, "Right"),
        style: (5, 4, "High/Medium"),
        core: [72, 88, 94, 87, 65, 78],
        skills: [
            94, 85, 55, 94, 82, 87, 93, 83, 94, 90, 76, 76, 78, 91, 78, 92, 63, 88, 74, 91, 76,
            66, 94, 70, 66,
        ],
    },
    ReferenceEntry {
        id: "209331",
        name: "Mohamed Salah",
        overall: 89,
        potential: 89,
        positions: &["RW"],
        club: "Liverpool",
        nationality: "Egypt",
        physical: (175, 71, 31, "Left"),
        style: (3, 4, "High/Medium"),
        core: [89, 87, 81, 90, 45, 75],
        skills: [
            80, 91, 59, 84, 83, 90, 86, 69, 75, 89, 89, 91, 91, 92, 90, 83, 69, 85, 75, 84, 63,
            55, 86, 38, 43,
        ],
    },
    ReferenceEntry {
        id: "202126",
        name: "Harry Kane",
        overall: 90,
        potential: 90,
        positions: &["ST"],
        club: "Bayern Munich",
        nationality: "England",
        physical: (188, 86, 30, "Right"),
        style: (5, 3, "High/High"),
        core: [67, 93, 84, 83, 49, 82],
        skills: [
            80, 95, 86, 88, 87, 82, 82, 82, 85, 88, 66, 68, 71, 91, 71, 94, 76, 83, 83, 91, 78,
            49, 89, 45, 44,
        ],
    },
    ReferenceEntry {
        id: "252371",
        name: "Jude Bellingham",
        overall: 86,
        potential: 92,
        positions: &["CAM", "CM"],
        club: "Real Madrid",
        nationality: "England",
        physical: (186, 75, 20, "Right"),
        style: (4, 4, "High/High"),
        core: [81, 82, 84, 88, 78, 82],
        skills: [
            73, 83, 80, 87, 78, 88, 77, 62, 83, 89, 79, 83, 84, 90, 80, 84, 85, 92, 79, 80, 86,
            82, 87, 74, 80,
        ],
    },
    ReferenceEntry {
        id: "238794",
        name: "Vinícius Júnior",
        overall: 89,
        potential: 94,
        positions: &["LW"],
        club: "Real Madrid",
        nationality: "Brazil",
        physical: (176, 73, 23, "Right"),
        style: (4, 5, "High/Medium"),
        core: [95, 84, 81, 91, 29, 69],
        skills: [
            80, 87, 48, 84, 77, 94, 84, 62, 72, 92, 96, 95, 94, 88, 85, 82, 75, 83, 65, 82, 53,
            29, 84, 25, 32,
        ],
    },
    ReferenceEntry {
        id: "231866",
        name: "Rodri",
        overall: 89,
        potential: 90,
        positions: &["CDM"],
        club: "Manchester City",
        nationality: "Spain",
        physical: (191, 82, 27, "Right"),
        style: (4, 3, "Medium/High"),
        core: [62, 79, 86, 84, 87, 85],
        skills: [
            70, 74, 81, 93, 65, 82, 83, 75, 91, 88, 58, 64, 67, 92, 74, 88, 79, 92, 84, 84, 82,
            92, 87, 82, 88,
        ],
    },
    ReferenceEntry {
        id: "188545",
        name: "Robert Lewandowski",
        overall: 90,
        potential: 90,
        positions: &["ST"],
        club: "FC Barcelona",
        nationality: "Poland",
        physical: (185, 81, 35, "Right"),
        style: (4, 4, "High/Medium"),
        core: [75, 91, 79, 86, 44, 82],
        skills: [
            71, 94, 91, 85, 88, 86, 82, 84, 71, 88, 74, 75, 77, 91, 82, 90, 84, 75, 84, 87, 81,
            49, 81, 35, 42,
        ],
    },
    ReferenceEntry {
        id: "203376",
        name: "Virgil van Dijk",
        overall: 89,
        potential: 89,
        positions: &["CB"],
        club: "Liverpool",
        nationality: "Netherlands",
        physical: (193, 92, 32, "Right"),
        style: (3, 2, "Medium/Medium"),
        core: [78, 60, 71, 72, 89, 86],
        skills: [
            53, 52, 86, 79, 45, 72, 60, 70, 86, 78, 72, 84, 61, 89, 53, 81, 89, 71, 92, 64, 84,
            89, 65, 92, 92,
        ],
    },
    ReferenceEntry {
        id: "215914",
        name: "N'Golo Kanté",
        overall: 84,
        potential: 84,
        positions: &["CDM", "CM"],
        club: "Al Ittihad",
        nationality: "France",
        physical: (168, 70, 32, "Right"),
        style: (3, 2, "Medium/High"),
        core: [76, 66, 75, 81, 87, 82],
        skills: [
            68, 65, 54, 86, 56, 81, 67, 49, 80, 84, 79, 74, 86, 88, 92, 71, 78, 95, 73, 66, 90,
            91, 79, 87, 90,
        ],
    },
    ReferenceEntry {
        id: "222665",
        name: "Martin Ødegaard",
        overall: 89,
        potential: 91,
        positions: &["CAM", "CM"],
        club: "Arsenal",
        nationality: "Norway",
        physical: (178, 68, 25, "Left"),
        style: (3, 4, "High/Medium"),
        core: [78, 80, 89, 89, 63, 68],
        skills: [
            80, 79, 51, 91, 78, 88, 87, 82, 87, 91, 78, 77, 87, 88, 88, 78, 60, 90, 63, 86, 65,
            58, 92, 56, 62,
        ],
    },
    ReferenceEntry {
        id: "177003",
        name: "Luka Modrić",
        overall: 86,
        potential: 86,
        positions: &["CM"],
        club: "Real Madrid",
        nationality: "Croatia",
        physical: (172, 66, 38, "Right"),
        style: (4, 4, "Medium/Medium"),
        core: [72, 76, 89, 88, 72, 66],
        skills: [
            86, 76, 56, 91, 81, 87, 86, 79, 91, 92, 74, 68, 91, 90, 93, 80, 67, 80, 60, 86, 65,
            81, 91, 67, 70,
        ],
    },
];

/// Build the built-in reference players
///
/// `reference_for` derives the external reference from `(id, name)`.
pub fn reference_players<F>(reference_for: F) -> Vec<RatedPlayer>
where
    F: Fn(&str, &str) -> String,
{
    REFERENCE
        .iter()
        .map(|entry| {
            let [pace, shooting, passing, dribbling, defending, physical] = entry.core;
            let (height_cm, weight_kg, age, foot) = entry.physical;
            let (weak_foot, skill_moves, work_rate) = entry.style;

            RatedPlayer {
                name: entry.name.to_string(),
                external_id: Some(entry.id.to_string()),
                reference: Some(reference_for(entry.id, entry.name)),
                overall: entry.overall,
                potential: entry.potential,
                positions: entry.positions.iter().map(|p| p.to_string()).collect(),
                club: Some(entry.club.to_string()),
                nationality: Some(entry.nationality.to_string()),
                physical: PhysicalAttributes {
                    height_cm: Some(height_cm),
                    weight_kg: Some(weight_kg),
                    age: Some(age),
                    preferred_foot: foot.to_string(),
                },
                weak_foot,
                skill_moves,
                work_rate: work_rate.to_string(),
                attributes: CoreAttributes::new(
                    pace, shooting, passing, dribbling, defending, physical,
                ),
                skills: SKILL_NAMES
                    .iter()
                    .zip(entry.skills.iter())
                    .map(|(name, value)| (name.to_string(), *value))
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_entries_complete() {
        let players = reference_players(|id, _| format!("ref/{}", id));
        assert!(players.len() >= 10);
        for player in &players {
            assert_eq!(player.skills.len(), SKILL_NAMES.len(), "{}", player.name);
            assert!(player.skills.values().all(|v| *v <= 99));
            assert!(player.overall <= player.potential, "{}", player.name);
            assert!(player.reference.as_deref().unwrap().starts_with("ref/"));
        }
    }
}
