//! Railway lines.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::DomainError;

/// Broad classification of a railway line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    Mainline,
    Branch,
    Metro,
    Suburban,
    Heritage,
}

impl LineType {
    /// Parse an explicit line type label (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "MAINLINE" | "MAIN_LINE" => Some(Self::Mainline),
            "BRANCH" => Some(Self::Branch),
            "METRO" => Some(Self::Metro),
            "SUBURBAN" => Some(Self::Suburban),
            "HERITAGE" => Some(Self::Heritage),
            _ => None,
        }
    }

    /// Infer a line type from keywords in the line name.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("branch") {
            Self::Branch
        } else if ["metro", "underground", "tube"].iter().any(|k| lower.contains(k)) {
            Self::Metro
        } else if lower.contains("suburban") || lower.contains("local") {
            Self::Suburban
        } else if lower.contains("heritage") || lower.contains("preserved") {
            Self::Heritage
        } else {
            Self::Mainline
        }
    }
}

/// Operational status of a railway line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    Active,
    Suspended,
    Closed,
}

impl LineStatus {
    /// Parse a status label (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" | "OPEN" => Some(Self::Active),
            "SUSPENDED" => Some(Self::Suspended),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A railway line: an ordered list of unique stations with per-pair data.
///
/// Pair data (journey times, distances, through connections) is stored
/// unordered, so a value recorded for A→B also answers B→A. Values are only
/// accepted for pairs where both stations are on the line.
#[derive(Debug, Clone, PartialEq)]
pub struct RailwayLine {
    name: String,
    operator: Option<String>,
    stations: Vec<String>,
    journey_times: HashMap<(String, String), u32>,
    distances: HashMap<(String, String), f64>,
    direct_connections: HashMap<(String, String), u32>,
    line_type: LineType,
    status: LineStatus,
}

impl RailwayLine {
    /// Create a line from its station sequence.
    ///
    /// Duplicate stations are dropped (first occurrence wins). Returns an
    /// error if fewer than two distinct stations remain.
    pub fn new(
        name: impl Into<String>,
        stations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let mut unique: Vec<String> = Vec::new();
        for station in stations {
            let station = station.into();
            if !unique.contains(&station) {
                unique.push(station);
            }
        }

        if unique.len() < 2 {
            return Err(DomainError::TooFewStations { line: name });
        }

        let line_type = LineType::infer(&name);
        Ok(Self {
            name,
            operator: None,
            stations: unique,
            journey_times: HashMap::new(),
            distances: HashMap::new(),
            direct_connections: HashMap::new(),
            line_type,
            status: LineStatus::Active,
        })
    }

    /// Set the operating company.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Set the line type, overriding the name-based inference.
    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: LineStatus) -> Self {
        self.status = status;
        self
    }

    /// Record a journey time between two stations on this line.
    ///
    /// Ignored if either station is not on the line.
    pub fn with_journey_time(mut self, a: &str, b: &str, minutes: u32) -> Self {
        if let Some(key) = self.pair_key(a, b) {
            self.journey_times.insert(key, minutes);
        }
        self
    }

    /// Record a distance between two stations on this line.
    ///
    /// Ignored if either station is not on the line.
    pub fn with_distance(mut self, a: &str, b: &str, km: f64) -> Self {
        if let Some(key) = self.pair_key(a, b) {
            self.distances.insert(key, km);
        }
        self
    }

    /// Record a through service between two stations on this line that
    /// runs without a change of train.
    pub fn with_direct_connection(mut self, a: &str, b: &str, minutes: u32) -> Self {
        if let Some(key) = self.pair_key(a, b) {
            self.direct_connections.insert(key, minutes);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    /// Stations in running order.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// Returns true if the line calls at the station.
    pub fn serves(&self, station: &str) -> bool {
        self.stations.iter().any(|s| s == station)
    }

    /// Position of a station in running order.
    pub fn index_of(&self, station: &str) -> Option<usize> {
        self.stations.iter().position(|s| s == station)
    }

    /// Recorded journey time between two stations, in either direction.
    pub fn journey_time(&self, a: &str, b: &str) -> Option<u32> {
        self.pair_key(a, b)
            .and_then(|key| self.journey_times.get(&key).copied())
    }

    /// Recorded distance between two stations, in either direction.
    pub fn distance(&self, a: &str, b: &str) -> Option<f64> {
        self.pair_key(a, b).and_then(|key| self.distances.get(&key).copied())
    }

    /// Adjacent station pairs in running order.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stations
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Declared through services as `(a, b, minutes)`.
    pub fn direct_connections(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.direct_connections
            .iter()
            .map(|((a, b), mins)| (a.as_str(), b.as_str(), *mins))
    }

    /// Canonical unordered key for a pair, or `None` if either station is
    /// not on the line or both are the same.
    fn pair_key(&self, a: &str, b: &str) -> Option<(String, String)> {
        if a == b || !self.serves(a) || !self.serves(b) {
            return None;
        }
        if a < b {
            Some((a.to_string(), b.to_string()))
        } else {
            Some((b.to_string(), a.to_string()))
        }
    }
}

impl fmt::Display for RailwayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} stations)",
            self.name,
            self.stations.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sw_main_line() -> RailwayLine {
        RailwayLine::new(
            "South Western Main Line",
            ["London Waterloo", "Clapham Junction", "Woking", "Basingstoke"],
        )
        .unwrap()
    }

    #[test]
    fn duplicates_are_dropped() {
        let line = RailwayLine::new("Loop", ["A", "B", "A", "C", "B"]).unwrap();
        assert_eq!(line.stations(), &["A", "B", "C"]);
    }

    #[test]
    fn too_few_stations_rejected() {
        let err = RailwayLine::new("Stub", ["A", "A"]).unwrap_err();
        assert_eq!(
            err,
            DomainError::TooFewStations {
                line: "Stub".into()
            }
        );
        assert!(RailwayLine::new("Empty", Vec::<String>::new()).is_err());
    }

    #[test]
    fn pair_data_is_symmetric() {
        let line = sw_main_line()
            .with_journey_time("Woking", "Clapham Junction", 19)
            .with_distance("Basingstoke", "Woking", 22.4);

        assert_eq!(line.journey_time("Clapham Junction", "Woking"), Some(19));
        assert_eq!(line.journey_time("Woking", "Clapham Junction"), Some(19));
        assert_eq!(line.distance("Woking", "Basingstoke"), Some(22.4));
        assert_eq!(line.journey_time("Woking", "Basingstoke"), None);
    }

    #[test]
    fn pair_data_for_foreign_station_ignored() {
        let line = sw_main_line().with_journey_time("Woking", "Reading", 30);
        assert_eq!(line.journey_time("Woking", "Reading"), None);
    }

    #[test]
    fn adjacent_pairs_follow_running_order() {
        let line = sw_main_line();
        let pairs: Vec<_> = line.adjacent_pairs().collect();
        assert_eq!(
            pairs,
            vec![
                ("London Waterloo", "Clapham Junction"),
                ("Clapham Junction", "Woking"),
                ("Woking", "Basingstoke"),
            ]
        );
    }

    #[test]
    fn serves_and_index() {
        let line = sw_main_line();
        assert!(line.serves("Woking"));
        assert!(!line.serves("Reading"));
        assert_eq!(line.index_of("Woking"), Some(2));
    }

    #[test]
    fn line_type_inference() {
        assert_eq!(LineType::infer("Marlow Branch"), LineType::Branch);
        assert_eq!(LineType::infer("Tyne and Wear Metro"), LineType::Metro);
        assert_eq!(LineType::infer("London Underground"), LineType::Metro);
        assert_eq!(LineType::infer("Leeds Local Lines"), LineType::Suburban);
        assert_eq!(LineType::infer("Bluebell Heritage Railway"), LineType::Heritage);
        assert_eq!(LineType::infer("West Coast Main Line"), LineType::Mainline);
    }

    #[test]
    fn labels_parse() {
        assert_eq!(LineType::parse("branch"), Some(LineType::Branch));
        assert_eq!(LineType::parse("nonsense"), None);
        assert_eq!(LineStatus::parse("Active"), Some(LineStatus::Active));
        assert_eq!(LineStatus::parse("closed"), Some(LineStatus::Closed));
    }

    #[test]
    fn display() {
        assert_eq!(
            sw_main_line().to_string(),
            "South Western Main Line (4 stations)"
        );
    }
}
