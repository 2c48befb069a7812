//! Coarse regional geography for long cross-country journeys.
//!
//! A journey between Scotland and the south of England is routed through
//! London rather than searched end to end. Regions come from station
//! latitude when the data has coordinates, with a short list of names as
//! fallback.

use std::fmt;

use tracing::info;

use crate::data::RailwayData;
use crate::termini::MAJOR_LONDON_TERMINALS;

/// Stations north of this latitude are in Scotland.
const SCOTLAND_MIN_LAT: f64 = 54.5;

/// Stations south of this latitude are in the south of England.
const SOUTH_ENGLAND_MAX_LAT: f64 = 52.0;

const SCOTLAND_NAMES: [&str; 4] = ["Glasgow", "Edinburgh", "Aberdeen", "Hillhead"];
const SOUTH_ENGLAND_NAMES: [&str; 3] = ["Southampton", "Portsmouth", "Bournemouth"];

/// Journeys known to need the cross-country treatment whatever their
/// coordinates say. Matched loosely in both directions.
const KNOWN_CROSS_COUNTRY_PAIRS: [(&str, &str); 2] = [
    ("Southampton Central", "Hillhead"),
    ("Southampton Central", "Glasgow Central"),
];

/// Main-line terminals for journeys leaving Scotland.
pub const SCOTTISH_TERMINALS: [&str; 5] = [
    "Glasgow Central",
    "Edinburgh Waverley",
    "Glasgow Queen Street",
    "Aberdeen",
    "Inverness",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Scotland,
    MiddleEngland,
    SouthEngland,
}

impl Region {
    /// Terminals a journey to or from this region passes through.
    pub fn terminals(&self) -> &'static [&'static str] {
        match self {
            Region::Scotland => &SCOTTISH_TERMINALS,
            Region::SouthEngland => &MAJOR_LONDON_TERMINALS,
            Region::MiddleEngland => &[],
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Region::Scotland => "Scotland",
            Region::MiddleEngland => "Middle England",
            Region::SouthEngland => "South England",
        };
        f.write_str(label)
    }
}

/// Region of a station, if it can be told.
pub fn station_region(station: &str, data: &dyn RailwayData) -> Option<Region> {
    if let Some(coords) = data.get_station_by_name(station).and_then(|s| s.coordinates) {
        let region = if coords.lat > SCOTLAND_MIN_LAT {
            Region::Scotland
        } else if coords.lat < SOUTH_ENGLAND_MAX_LAT {
            Region::SouthEngland
        } else {
            Region::MiddleEngland
        };
        return Some(region);
    }

    if SCOTLAND_NAMES.iter().any(|n| station.contains(n)) {
        Some(Region::Scotland)
    } else if SOUTH_ENGLAND_NAMES.iter().any(|n| station.contains(n)) {
        Some(Region::SouthEngland)
    } else {
        None
    }
}

/// Loose name match: equal, or one contains the other, ignoring case.
fn names_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a == b || a.contains(&b) || b.contains(&a)
}

/// Whether a pair of stations is on the fixed list of cross-country
/// journeys, in either direction.
pub fn is_known_cross_country_pair(from: &str, to: &str) -> bool {
    KNOWN_CROSS_COUNTRY_PAIRS.iter().any(|(a, b)| {
        (names_match(from, a) && names_match(to, b)) || (names_match(from, b) && names_match(to, a))
    })
}

/// The regions at either end of a Scotland ↔ South England journey.
pub fn cross_country_regions(from: &str, to: &str, data: &dyn RailwayData) -> Option<(Region, Region)> {
    match (station_region(from, data)?, station_region(to, data)?) {
        pair @ ((Region::Scotland, Region::SouthEngland) | (Region::SouthEngland, Region::Scotland)) => Some(pair),
        _ => None,
    }
}

/// Whether a journey should be routed through London as a cross-country
/// composite.
pub fn is_cross_country_route(from: &str, to: &str, data: &dyn RailwayData) -> bool {
    let detected = cross_country_regions(from, to, data).is_some() || is_known_cross_country_pair(from, to);
    if detected {
        info!(from = %from, to = %to, "Detected cross-country route");
    }
    detected
}

/// The terminus a station should join or leave the main line at.
///
/// The station itself if it is one, else the first terminus sharing a
/// line with it, else the first terminus.
pub fn find_best_terminus(station: &str, terminals: &[&str], data: &dyn RailwayData) -> String {
    if terminals.contains(&station) {
        return station.to_string();
    }

    terminals
        .iter()
        .find(|t| !data.get_common_lines(station, t).is_empty())
        .or_else(|| terminals.first())
        .map_or_else(|| "London Waterloo".to_string(), |t| t.to_string())
}

/// The two London terminals an underground hop across London joins.
///
/// A London terminus stands for itself. A non-London origin starts from
/// Waterloo; a non-London destination is reached from the usual onward
/// terminal for the start. The two ends never coincide.
pub fn best_london_connection(from_terminus: &str, to_terminus: &str) -> (String, String) {
    let onward = |terminal: &str| match terminal {
        "London Euston" => "London Waterloo",
        _ => "London Euston",
    };

    let from = if from_terminus.starts_with("London ") {
        from_terminus
    } else {
        "London Waterloo"
    };
    let mut to = if to_terminus.starts_with("London ") {
        to_terminus
    } else {
        onward(from)
    };

    if from == to {
        to = if from == "London Euston" {
            "London Kings Cross"
        } else {
            "London Euston"
        };
    }

    (from.to_string(), to.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StationLineRepository;
    use crate::domain::{Coordinates, RailwayLine, Station};

    fn repo() -> StationLineRepository {
        let swml = RailwayLine::new(
            "South Western Main Line",
            ["Southampton Central", "Winchester", "London Waterloo"],
        )
        .unwrap();
        let wcml = RailwayLine::new("West Coast Main Line", ["London Euston", "Preston", "Glasgow Central"]).unwrap();
        StationLineRepository::from_lines(vec![swml, wcml])
            .with_station_details(Station::new("Preston").with_coordinates(Coordinates::new(53.76, -2.71)))
            .with_station_details(Station::new("Winchester").with_coordinates(Coordinates::new(51.07, -1.32)))
    }

    #[test]
    fn regions_from_coordinates_then_names() {
        let repo = repo();

        assert_eq!(station_region("Preston", &repo), Some(Region::MiddleEngland));
        assert_eq!(station_region("Winchester", &repo), Some(Region::SouthEngland));
        assert_eq!(station_region("Glasgow Central", &repo), Some(Region::Scotland));
        assert_eq!(station_region("Hillhead", &repo), Some(Region::Scotland));
        assert_eq!(station_region("Southampton Central", &repo), Some(Region::SouthEngland));
        assert_eq!(station_region("Leeds", &repo), None);
    }

    #[test]
    fn cross_country_detection() {
        let repo = repo();

        assert!(is_cross_country_route("Winchester", "Glasgow Central", &repo));
        assert!(is_cross_country_route("Edinburgh Waverley", "Portsmouth Harbour", &repo));
        assert!(!is_cross_country_route("Preston", "Glasgow Central", &repo));
        assert!(!is_cross_country_route("Leeds", "York", &repo));

        assert_eq!(
            cross_country_regions("Hillhead", "Winchester", &repo),
            Some((Region::Scotland, Region::SouthEngland))
        );
    }

    #[test]
    fn known_pairs_match_loosely_both_ways() {
        assert!(is_known_cross_country_pair("Southampton Central", "Hillhead"));
        assert!(is_known_cross_country_pair("Glasgow Central", "Southampton Central"));
        assert!(is_known_cross_country_pair("southampton", "hillhead"));
        assert!(!is_known_cross_country_pair("Southampton Central", "Edinburgh"));
    }

    #[test]
    fn best_terminus() {
        let repo = repo();
        let south = Region::SouthEngland.terminals();

        assert_eq!(find_best_terminus("London Euston", south, &repo), "London Euston");
        assert_eq!(find_best_terminus("Southampton Central", south, &repo), "London Waterloo");
        assert_eq!(
            find_best_terminus("Hillhead", Region::Scotland.terminals(), &repo),
            "Glasgow Central"
        );
        assert_eq!(find_best_terminus("Nowhere", &[], &repo), "London Waterloo");
    }

    #[test]
    fn london_connection() {
        let pair = |a, b| best_london_connection(a, b);
        let owned = |a: &str, b: &str| (a.to_string(), b.to_string());

        assert_eq!(pair("London Waterloo", "Glasgow Central"), owned("London Waterloo", "London Euston"));
        assert_eq!(pair("London Euston", "Glasgow Central"), owned("London Euston", "London Waterloo"));
        assert_eq!(pair("Glasgow Central", "London Victoria"), owned("London Waterloo", "London Victoria"));
        assert_eq!(pair("Glasgow Central", "London Waterloo"), owned("London Waterloo", "London Euston"));
        assert_eq!(pair("London Euston", "London Euston"), owned("London Euston", "London Kings Cross"));
    }
}
