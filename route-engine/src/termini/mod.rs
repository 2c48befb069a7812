//! London termini and the station pairs routing treats specially.
//!
//! King's Cross and St Pancras share a concourse, so moving between them is
//! an interchange rather than a walk across town. Farnborough's two stations
//! are joined by a short bridge. The terminal lists here are what the
//! routing heuristics key on.

use std::collections::HashSet;

/// The eight major London termini used for search exploration and the
/// underground routing bonus.
pub const MAJOR_LONDON_TERMINALS: [&str; 8] = [
    "London Waterloo",
    "London Liverpool Street",
    "London Victoria",
    "London Paddington",
    "London Kings Cross",
    "London St Pancras",
    "London Euston",
    "London Bridge",
];

/// Termini between which a connection is never treated as a walk.
pub const PRIMARY_LONDON_TERMINALS: [&str; 4] = [
    "London Waterloo",
    "London Liverpool Street",
    "London Victoria",
    "London Paddington",
];

/// Termini recognized when classifying terminal-to-terminal walks.
pub const EXTENDED_LONDON_TERMINALS: [&str; 9] = [
    "London Waterloo",
    "London Liverpool Street",
    "London Victoria",
    "London Paddington",
    "London Kings Cross",
    "London St Pancras",
    "London Euston",
    "London Bridge",
    "London Charing Cross",
];

/// Every London terminal that is also an underground interchange.
pub const LONDON_TERMINALS: [&str; 12] = [
    "London Waterloo",
    "London Liverpool Street",
    "London Victoria",
    "London Paddington",
    "London Kings Cross",
    "London St Pancras",
    "London Euston",
    "London Bridge",
    "London Charing Cross",
    "London Cannon Street",
    "London Fenchurch Street",
    "London Marylebone",
];

pub fn is_major_london_terminal(station: &str) -> bool {
    MAJOR_LONDON_TERMINALS.contains(&station)
}

/// An unordered set of station pairs.
///
/// Each pair is stored once with its names sorted, so lookups ignore order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationPairs {
    pairs: HashSet<(String, String)>,
}

impl StationPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. Returns false for a self-pair or a pair already present.
    pub fn insert(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        self.pairs.insert(ordered(a, b))
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&ordered(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for StationPairs {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut pairs = Self::new();
        for (a, b) in iter {
            pairs.insert(a, b);
        }
        pairs
    }
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// London termini pairs that are one interchange rather than a walk.
pub fn directly_connected_termini() -> StationPairs {
    [
        ("London Kings Cross", "London St Pancras"),
        ("London Waterloo", "London Waterloo East"),
    ]
    .into_iter()
    .collect()
}

/// Short bridges between adjacent stations on different lines.
///
/// A hop across one is preferred over other ways of reaching the same
/// neighbour.
pub fn walking_bridges() -> StationPairs {
    [("Farnborough North", "Farnborough (Main)")].into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_ignore_order() {
        let mut pairs = StationPairs::new();
        assert!(pairs.insert("London Euston", "London Kings Cross"));
        assert!(!pairs.insert("London Kings Cross", "London Euston"));
        assert!(!pairs.insert("London Euston", "London Euston"));

        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains("London Kings Cross", "London Euston"));
        assert!(pairs.contains("London Euston", "London Kings Cross"));
        assert!(!pairs.contains("London Euston", "London Euston"));
    }

    #[test]
    fn known_pairs() {
        let termini = directly_connected_termini();
        assert_eq!(termini.len(), 2);
        assert!(termini.contains("London St Pancras", "London Kings Cross"));
        assert!(termini.contains("London Waterloo East", "London Waterloo"));
        assert!(!termini.contains("London Euston", "London Kings Cross"));

        let bridges = walking_bridges();
        assert!(bridges.contains("Farnborough (Main)", "Farnborough North"));
        assert!(!bridges.is_empty());
        assert!(StationPairs::new().is_empty());
    }

    #[test]
    fn terminal_lists_nest() {
        for t in PRIMARY_LONDON_TERMINALS {
            assert!(MAJOR_LONDON_TERMINALS.contains(&t));
        }
        for t in MAJOR_LONDON_TERMINALS {
            assert!(EXTENDED_LONDON_TERMINALS.contains(&t));
            assert!(LONDON_TERMINALS.contains(&t));
        }
        assert!(is_major_london_terminal("London Bridge"));
        assert!(!is_major_london_terminal("London Marylebone"));
    }
}
