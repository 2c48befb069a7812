//! Station name normalization.
//!
//! Callers type station names loosely ("kings cross", "St. Pancras",
//! "Waterloo"). The normalizer maps them onto the canonical names the
//! repository knows, falling back to the trimmed input.

use std::collections::{HashMap, HashSet};

/// Known aliases as (alias, canonical name).
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Kings Cross", "London Kings Cross"),
    ("St Pancras", "London St Pancras"),
    ("St Pancras International", "London St Pancras"),
    ("Newcastle Central", "Newcastle"),
    ("Glasgow Queen St", "Glasgow Queen Street"),
    ("Edinburgh", "Edinburgh Waverley"),
    ("Manchester", "Manchester Piccadilly"),
    ("Birmingham", "Birmingham New Street"),
];

/// Maps caller-supplied names onto repository-known station names.
#[derive(Debug, Clone, Default)]
pub struct StationNameNormalizer {
    known: HashSet<String>,
    by_lowercase: HashMap<String, String>,
    by_folded: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

impl StationNameNormalizer {
    /// Create a normalizer over the given canonical names, with the default
    /// alias table.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut normalizer = Self::default();
        for name in names {
            normalizer.known.insert(name.to_string());
            normalizer
                .by_lowercase
                .entry(name.to_lowercase())
                .or_insert_with(|| name.to_string());
            normalizer
                .by_folded
                .entry(fold(name))
                .or_insert_with(|| name.to_string());
        }
        for (alias, canonical) in DEFAULT_ALIASES {
            normalizer = normalizer.with_alias(alias, canonical);
        }
        normalizer
    }

    /// Add an alias. Aliases only apply when their target is a known name.
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases.insert(fold(alias), canonical.to_string());
        self
    }

    /// Number of canonical names.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Canonicalize a station name.
    ///
    /// Tries, in order: exact, alias, case-insensitive, punctuation-insensitive,
    /// then the same with a "London " prefix removed or added. Unknown names
    /// come back trimmed but otherwise unchanged.
    pub fn normalize(&self, name: &str) -> String {
        let trimmed = name.trim();
        if self.known.contains(trimmed) {
            return trimmed.to_string();
        }

        if let Some(canonical) = self.aliases.get(&fold(trimmed))
            && self.known.contains(canonical)
        {
            return canonical.clone();
        }

        if let Some(found) = self.loose_match(trimmed) {
            return found;
        }

        let prefixed = match strip_london_prefix(trimmed) {
            Some(rest) => self.loose_match(rest),
            None => self.loose_match(&format!("London {trimmed}")),
        };
        prefixed.unwrap_or_else(|| trimmed.to_string())
    }

    fn loose_match(&self, candidate: &str) -> Option<String> {
        if self.known.contains(candidate) {
            return Some(candidate.to_string());
        }
        self.by_lowercase
            .get(&candidate.to_lowercase())
            .or_else(|| self.by_folded.get(&fold(candidate)))
            .cloned()
    }
}

/// Strip a case-insensitive "London " prefix.
fn strip_london_prefix(name: &str) -> Option<&str> {
    let prefix = "london ";
    name.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix) && name.len() > prefix.len())
        .map(|_| &name[prefix.len()..])
}

/// Lowercase, drop apostrophes/periods/commas, "&" as "and", collapse spaces.
fn fold(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .replace('&', " and ")
        .chars()
        .filter(|c| !matches!(c, '\'' | '’' | '.' | ','))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> StationNameNormalizer {
        StationNameNormalizer::new([
            "London Waterloo",
            "London Kings Cross",
            "London St Pancras",
            "Clapham Junction",
            "Newcastle",
            "Bishop's Stortford",
            "Brighton & Hove",
        ])
    }

    #[test]
    fn exact_names_pass_through() {
        assert_eq!(normalizer().normalize("Clapham Junction"), "Clapham Junction");
        assert_eq!(normalizer().normalize("  Clapham Junction "), "Clapham Junction");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(normalizer().normalize("clapham junction"), "Clapham Junction");
    }

    #[test]
    fn punctuation_insensitive() {
        let n = normalizer();
        assert_eq!(n.normalize("Bishops Stortford"), "Bishop's Stortford");
        assert_eq!(n.normalize("Brighton and Hove"), "Brighton & Hove");
    }

    #[test]
    fn london_prefix_added_and_removed() {
        let n = normalizer();
        assert_eq!(n.normalize("Waterloo"), "London Waterloo");
        assert_eq!(n.normalize("london clapham junction"), "Clapham Junction");
    }

    #[test]
    fn aliases() {
        let n = normalizer();
        assert_eq!(n.normalize("King's Cross"), "London Kings Cross");
        assert_eq!(n.normalize("St. Pancras International"), "London St Pancras");
        assert_eq!(n.normalize("Newcastle Central"), "Newcastle");
    }

    #[test]
    fn alias_to_unknown_target_is_ignored() {
        // "Edinburgh Waverley" is not a known name here
        assert_eq!(normalizer().normalize("Edinburgh"), "Edinburgh");
    }

    #[test]
    fn custom_alias() {
        let n = normalizer().with_alias("Clapham Jn", "Clapham Junction");
        assert_eq!(n.normalize("clapham jn"), "Clapham Junction");
    }

    #[test]
    fn unknown_names_unchanged() {
        assert_eq!(normalizer().normalize("Oxford Circus"), "Oxford Circus");
        assert_eq!(normalizer().len(), 7);
    }
}
