//! Which underground system, if any, a station belongs to.

use crate::data::RailwayData;

use super::systems::{UndergroundNetworks, UndergroundSystem};

/// Classifies stations against the loaded underground systems.
///
/// A station is underground-only when it belongs to a system but no
/// national-rail line calls there, and mixed when both are true.
#[derive(Debug, Clone, Default)]
pub struct StationClassifier {
    networks: UndergroundNetworks,
}

impl StationClassifier {
    pub fn new(networks: UndergroundNetworks) -> Self {
        Self { networks }
    }

    pub fn networks(&self) -> &UndergroundNetworks {
        &self.networks
    }

    /// The system a station belongs to, trying London, Glasgow then Tyne
    /// and Wear.
    pub fn underground_system(&self, station: &str) -> Option<UndergroundSystem> {
        UndergroundSystem::ALL
            .into_iter()
            .find(|&system| self.is_system_station(station, system))
    }

    pub fn is_underground_station(&self, station: &str) -> bool {
        self.underground_system(station).is_some()
    }

    /// Whether a station is on one system, allowing for the way national
    /// rail names the same place.
    pub fn is_system_station(&self, station: &str, system: UndergroundSystem) -> bool {
        let Some(stations) = self.networks.system(system).map(|s| &s.stations) else {
            return false;
        };
        if stations.contains(station) {
            return true;
        }

        let lower = station.to_lowercase();
        match system {
            UndergroundSystem::London => {
                if let Some(bare) = station.strip_prefix("London ")
                    && stations.contains(bare)
                {
                    return true;
                }
                if lower.contains("king")
                    && (lower.contains("cross") || lower.contains("pancras"))
                    && stations.contains("Kings Cross St Pancras")
                {
                    return true;
                }
            }
            UndergroundSystem::Glasgow => {
                if lower.contains("glasgow central") {
                    return stations.contains("St Enoch");
                }
                if lower.contains("glasgow queen street") {
                    return stations.contains("Buchanan Street");
                }
            }
            UndergroundSystem::TyneWear => {
                if lower == "newcastle" || lower == "newcastle central" {
                    return stations.contains("Central Station");
                }
            }
        }

        let clean = strip_punctuation(station);
        stations.iter().any(|s| strip_punctuation(s) == clean)
    }

    /// On an underground system and not served by national rail.
    pub fn is_underground_only(&self, station: &str, data: &dyn RailwayData) -> bool {
        self.is_underground_station(station) && !data.validate_station_exists(station)
    }

    /// On an underground system and served by national rail.
    pub fn is_mixed(&self, station: &str, data: &dyn RailwayData) -> bool {
        self.is_underground_station(station) && data.validate_station_exists(station)
    }

    /// Terminal stations of a system.
    pub fn system_terminals(&self, system: UndergroundSystem) -> Vec<String> {
        self.networks.terminals(system)
    }

    pub fn is_system_terminal(&self, station: &str, system: UndergroundSystem) -> bool {
        self.system_terminals(system).iter().any(|t| t == station)
    }

    /// Whether a station is a terminal of the system it belongs to.
    pub fn is_terminal_station(&self, station: &str) -> bool {
        self.underground_system(station)
            .is_some_and(|system| self.is_system_terminal(station, system))
    }

    pub fn is_london_terminal(&self, station: &str) -> bool {
        self.is_system_terminal(station, UndergroundSystem::London)
    }
}

fn strip_punctuation(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '\'' | '.')).collect()
}
