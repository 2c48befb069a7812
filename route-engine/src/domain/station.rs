//! Stations and geographic coordinates.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle (haversine) distance to another point, in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// A national-rail station known to the repository.
///
/// Stations are derived from the railway lines that serve them; a station
/// with two or more serving lines is an interchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    /// Canonical station name (e.g. "London Waterloo")
    pub name: String,

    /// Fare zone, where the source data provides one
    pub zone: Option<u8>,

    /// Location, where the source data provides one
    pub coordinates: Option<Coordinates>,

    /// Names of the lines this station interchanges between.
    /// Empty unless at least two lines call here.
    pub interchange: Vec<String>,
}

impl Station {
    /// Create a station with no zone, coordinates or interchanges.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone: None,
            coordinates: None,
            interchange: Vec::new(),
        }
    }

    /// Set the coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Returns true if passengers can change between lines here.
    pub fn is_interchange(&self) -> bool {
        self.interchange.len() >= 2
    }

    /// Returns true if the name marks a London station.
    pub fn is_london(&self) -> bool {
        is_london_name(&self.name)
    }
}

/// Returns true if a station name refers to London.
///
/// The network data names London stations "London X", so a substring
/// check is what the routing heuristics use.
pub fn is_london_name(name: &str) -> bool {
    name.contains("London")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        let p = Coordinates::new(51.5, -0.12);
        assert!(p.distance_km(&p).abs() < 1e-9);
    }

    #[test]
    fn haversine_london_to_glasgow() {
        let euston = Coordinates::new(51.5282, -0.1337);
        let glasgow = Coordinates::new(55.8590, -4.2577);

        let d = euston.distance_km(&glasgow);
        assert!((d - 555.0).abs() < 10.0, "unexpected distance {d}");
        assert!((glasgow.distance_km(&euston) - d).abs() < 1e-9);
    }

    #[test]
    fn interchange_needs_two_lines() {
        let mut station = Station::new("Reading");
        assert!(!station.is_interchange());

        station.interchange = vec!["Great Western Main Line".into()];
        assert!(!station.is_interchange());

        station.interchange.push("Reading to Taunton Line".into());
        assert!(station.is_interchange());
    }

    #[test]
    fn london_names() {
        assert!(Station::new("London Waterloo").is_london());
        assert!(!Station::new("Woking").is_london());
        assert!(is_london_name("London Bridge"));
    }
}
