//! Player name normalization
//!
//! Canonical form used for every name comparison: NFD-decomposed with
//! combining marks stripped, lowercase, apostrophes/periods/hyphens turned
//! into spaces, whitespace runs collapsed, trimmed.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a free-text player name
///
/// Idempotent: `normalize_name(&normalize_name(s)) == normalize_name(s)`.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '\'' | '\u{2019}' | '.' | '-' => ' ',
            other => other,
        })
        .collect();

    // Lowercasing may produce new decomposable characters; a second pass keeps
    // the output stable under re-normalization.
    let stripped: String = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a normalized name into its space-delimited terms
pub fn terms(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize_name("Kylian Mbappé"), "kylian mbappe");
        assert_eq!(normalize_name("Martin Ødegaard"), "martin ødegaard");
        assert_eq!(normalize_name("Luka Modrić"), "luka modric");
        assert_eq!(normalize_name("Vinícius Júnior"), "vinicius junior");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(normalize_name("N'Golo Kanté"), "n golo kante");
        assert_eq!(normalize_name("Alexander-Arnold"), "alexander arnold");
        assert_eq!(normalize_name("K. De Bruyne"), "k de bruyne");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_name("  Erling \t  Haaland \n"), "erling haaland");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
        assert_eq!(normalize_name(".-'"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Kylian Mbappé",
            "N'Golo Kanté",
            "  ÉDER   Militão ",
            "Jérôme Boateng-Müller",
            "İlkay Gündoğan",
            "ß straße",
            "",
        ];
        for sample in samples {
            let once = normalize_name(sample);
            assert_eq!(normalize_name(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_terms_split() {
        assert_eq!(terms("erling haaland"), vec!["erling", "haaland"]);
        assert!(terms("").is_empty());
    }
}
