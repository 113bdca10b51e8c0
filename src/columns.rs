//! Header-to-field mapping rules for the keyword-export import collaborator.
//!
//! The export files in the wild carry inconsistent column headers ("Current
//! position", "Position", "KD", "Keyword Difficulty", ...). Rather than ad
//! hoc matching code, the mapping is an ordered rule table evaluated in
//! priority order, first match wins. The table is plain data so individual
//! rules can be tested and extended without touching the resolver.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Keyword,
    Position,
    Volume,
    Difficulty,
    CostPerClick,
    Traffic,
    PreviousTraffic,
    PreviousPosition,
    PreviousDate,
    Url,
    SerpFeatures,
}

pub struct ColumnRule {
    pub field: CanonicalField,
    pub patterns: &'static [&'static str],
}

/// Priority-ordered rules. "Previous *" rules sit above their plain
/// counterparts so "previous position" never resolves to `Position`.
pub const COLUMN_RULES: &[ColumnRule] = &[
    ColumnRule {
        field: CanonicalField::PreviousPosition,
        patterns: &["previous position", "prev position", "old position"],
    },
    ColumnRule {
        field: CanonicalField::PreviousTraffic,
        patterns: &["previous traffic", "prev traffic", "old traffic"],
    },
    ColumnRule {
        field: CanonicalField::PreviousDate,
        patterns: &["previous date", "prev date", "compared to"],
    },
    ColumnRule {
        field: CanonicalField::Keyword,
        patterns: &["keyword", "query", "search term", "kw"],
    },
    ColumnRule {
        field: CanonicalField::Position,
        patterns: &["current position", "position", "rank"],
    },
    ColumnRule {
        field: CanonicalField::Volume,
        patterns: &["search volume", "volume"],
    },
    ColumnRule {
        field: CanonicalField::Difficulty,
        patterns: &["keyword difficulty", "difficulty", "kd"],
    },
    ColumnRule {
        field: CanonicalField::CostPerClick,
        patterns: &["cost per click", "cpc"],
    },
    ColumnRule {
        field: CanonicalField::Traffic,
        patterns: &["organic traffic", "traffic"],
    },
    ColumnRule {
        field: CanonicalField::Url,
        patterns: &["current url", "page url", "url", "page"],
    },
    ColumnRule {
        field: CanonicalField::SerpFeatures,
        patterns: &["serp features", "serp"],
    },
];

/// Resolve a raw header to its canonical field. Patterns of fewer than four
/// characters must match the whole header; longer patterns match as
/// substrings of the normalized header.
pub fn resolve_header(header: &str) -> Option<CanonicalField> {
    let normalized = header.trim().to_ascii_lowercase();
    for rule in COLUMN_RULES {
        for pattern in rule.patterns {
            let matched = if pattern.len() < 4 {
                normalized == *pattern
            } else {
                normalized.contains(pattern)
            };
            if matched {
                return Some(rule.field);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_rules_win_over_plain_counterparts() {
        assert_eq!(
            resolve_header("Previous position"),
            Some(CanonicalField::PreviousPosition)
        );
        assert_eq!(
            resolve_header("Previous organic traffic"),
            Some(CanonicalField::PreviousTraffic)
        );
    }

    #[test]
    fn test_plain_headers_resolve() {
        assert_eq!(resolve_header("Current position"), Some(CanonicalField::Position));
        assert_eq!(resolve_header("Position"), Some(CanonicalField::Position));
        assert_eq!(resolve_header(" Search Volume "), Some(CanonicalField::Volume));
        assert_eq!(resolve_header("Organic traffic"), Some(CanonicalField::Traffic));
        assert_eq!(resolve_header("SERP features"), Some(CanonicalField::SerpFeatures));
    }

    #[test]
    fn test_short_patterns_require_exact_match() {
        assert_eq!(resolve_header("KD"), Some(CanonicalField::Difficulty));
        assert_eq!(resolve_header("CPC"), Some(CanonicalField::CostPerClick));
        // "url" must not fire on arbitrary headers containing the letters.
        assert_eq!(resolve_header("Current URL"), Some(CanonicalField::Url));
        assert_eq!(resolve_header("curled"), None);
    }

    #[test]
    fn test_unknown_headers_resolve_to_none() {
        assert_eq!(resolve_header("Last updated by"), None);
        assert_eq!(resolve_header(""), None);
    }

    #[test]
    fn test_every_field_is_reachable() {
        use CanonicalField::*;
        let reached: Vec<CanonicalField> = COLUMN_RULES.iter().map(|r| r.field).collect();
        for field in [
            Keyword, Position, Volume, Difficulty, CostPerClick, Traffic, PreviousTraffic,
            PreviousPosition, PreviousDate, Url, SerpFeatures,
        ] {
            assert!(reached.contains(&field));
        }
    }
}
