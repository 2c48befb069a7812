//! On-disk document formats and their conversion into domain types.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{Coordinates, DomainError, LineStatus, LineType, RailwayLine};

/// File name of the optional line index in the data directory.
pub const LINE_INDEX_FILE: &str = "railway_lines_index_comprehensive.json";

/// File name of the optional interchange connections document.
pub const INTERCHANGE_FILE: &str = "interchange_connections.json";

/// Default time for a walking interchange with no recorded time.
const DEFAULT_WALK_MINUTES: f64 = 10.0;

/// Default length for a walking interchange with no recorded distance.
const DEFAULT_WALK_METRES: f64 = 1000.0;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LineMetadata {
    #[serde(default)]
    pub line_name: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub line_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A station entry in a line document: either a bare name or an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum StationEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        zone: Option<serde_json::Value>,
        #[serde(default)]
        coordinates: Option<Coordinates>,
    },
}

/// A single railway line file.
#[derive(Debug, Deserialize)]
pub(crate) struct LineDocument {
    #[serde(default)]
    pub metadata: LineMetadata,
    #[serde(default)]
    pub stations: Option<Vec<StationEntry>>,
    #[serde(default)]
    pub major_stations: Option<Vec<StationEntry>>,
    #[serde(default)]
    pub typical_journey_times: HashMap<String, f64>,
    #[serde(default)]
    pub distances: HashMap<String, f64>,
    #[serde(default)]
    pub direct_connections: HashMap<String, f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LineIndex {
    #[serde(default)]
    pub lines: Vec<LineIndexEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LineIndexEntry {
    pub file: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InterchangeDocument {
    #[serde(default)]
    pub connections: Vec<InterchangeEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InterchangeEntry {
    #[serde(default)]
    pub from_station: Option<String>,
    #[serde(default)]
    pub to_station: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub time_minutes: Option<f64>,
    #[serde(default)]
    pub walking_distance_m: Option<f64>,
}

/// Per-station details carried by a line document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StationRecord {
    pub name: String,
    pub zone: Option<u8>,
    pub coordinates: Option<Coordinates>,
}

/// A line document turned into domain data.
#[derive(Debug)]
pub(crate) struct ParsedLine {
    pub line: RailwayLine,
    pub stations: Vec<StationRecord>,
}

/// A walk between two nearby stations that is not part of any line.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingLink {
    pub from_station: String,
    pub to_station: String,
    pub time_minutes: u32,
    pub distance_km: f64,
}

impl WalkingLink {
    pub fn new(
        from_station: impl Into<String>,
        to_station: impl Into<String>,
        time_minutes: u32,
        distance_km: f64,
    ) -> Self {
        Self {
            from_station: from_station.into(),
            to_station: to_station.into(),
            time_minutes,
            distance_km,
        }
    }
}

impl StationEntry {
    fn into_record(self) -> StationRecord {
        match self {
            StationEntry::Name(name) => StationRecord {
                name: name.trim().to_string(),
                zone: None,
                coordinates: None,
            },
            StationEntry::Detailed {
                name,
                zone,
                coordinates,
            } => StationRecord {
                name: name.trim().to_string(),
                zone: zone.as_ref().and_then(parse_zone),
                coordinates,
            },
        }
    }
}

/// Zones appear as numbers or strings ("2", "Zone 2") in the source data.
fn parse_zone(value: &serde_json::Value) -> Option<u8> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|z| u8::try_from(z).ok()),
        serde_json::Value::String(s) => s
            .trim()
            .trim_start_matches("Zone")
            .trim()
            .parse()
            .ok(),
        _ => None,
    }
}

/// Derive a line name from a file stem: "west_coast_main_line" -> "West Coast Main Line".
pub(crate) fn line_name_from_stem(stem: &str) -> String {
    stem.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split an "A-B" pair key into two stations on the line.
///
/// Station names may themselves contain hyphens, so every split point is
/// tried and the first one naming two stations on the line wins.
pub(crate) fn split_pair_key<'k>(key: &'k str, line: &RailwayLine) -> Option<(&'k str, &'k str)> {
    key.match_indices('-').find_map(|(idx, _)| {
        let a = key[..idx].trim();
        let b = key[idx + 1..].trim();
        (line.serves(a) && line.serves(b)).then_some((a, b))
    })
}

/// Minutes rounded to the nearest whole minute, never negative.
fn whole_minutes(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

impl LineDocument {
    /// Convert this document into a line plus station details.
    ///
    /// `stem` names the file and provides the fallback line name; `index`
    /// may override name and operator.
    pub(crate) fn into_parsed(
        self,
        stem: &str,
        index: Option<&LineIndexEntry>,
    ) -> Result<ParsedLine, DomainError> {
        let name = index
            .and_then(|entry| entry.name.clone())
            .or(self.metadata.line_name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| line_name_from_stem(stem));

        let records: Vec<StationRecord> = self
            .stations
            .or(self.major_stations)
            .unwrap_or_default()
            .into_iter()
            .map(StationEntry::into_record)
            .filter(|r| !r.name.is_empty())
            .collect();

        let mut line = RailwayLine::new(&name, records.iter().map(|r| r.name.clone()))?;

        if let Some(operator) = index
            .and_then(|entry| entry.operator.clone())
            .or(self.metadata.operator)
        {
            line = line.with_operator(operator);
        }
        if let Some(line_type) = self.metadata.line_type.as_deref().and_then(LineType::parse) {
            line = line.with_line_type(line_type);
        }
        if let Some(status) = self.metadata.status.as_deref().and_then(LineStatus::parse) {
            line = line.with_status(status);
        }

        for (key, minutes) in &self.typical_journey_times {
            if let Some((a, b)) = split_pair_key(key, &line) {
                line = line.with_journey_time(a, b, whole_minutes(*minutes));
            }
        }
        for (key, km) in &self.distances {
            if let Some((a, b)) = split_pair_key(key, &line)
                && km.is_finite()
                && *km >= 0.0
            {
                line = line.with_distance(a, b, *km);
            }
        }
        for (key, minutes) in &self.direct_connections {
            if let Some((a, b)) = split_pair_key(key, &line) {
                line = line.with_direct_connection(a, b, whole_minutes(*minutes));
            }
        }

        Ok(ParsedLine {
            line,
            stations: records,
        })
    }
}

impl InterchangeDocument {
    /// Walking links declared in the document. Non-walking entries and
    /// entries without both endpoints are ignored.
    pub(crate) fn walking_links(self) -> Vec<WalkingLink> {
        self.connections
            .into_iter()
            .filter(|c| c.connection_type.as_deref() == Some("WALKING"))
            .filter_map(|c| {
                let from = c.from_station.filter(|s| !s.trim().is_empty())?;
                let to = c.to_station.filter(|s| !s.trim().is_empty())?;
                let minutes = whole_minutes(c.time_minutes.unwrap_or(DEFAULT_WALK_MINUTES));
                let km = c.walking_distance_m.unwrap_or(DEFAULT_WALK_METRES) / 1000.0;
                Some(WalkingLink::new(from.trim(), to.trim(), minutes, km))
            })
            .collect()
    }
}
