//! Where underground journeys meet the national-rail network.

use tracing::debug;

use crate::data::RailwayData;
use crate::termini::{LONDON_TERMINALS, PRIMARY_LONDON_TERMINALS};

use super::classifier::StationClassifier;
use super::systems::UndergroundSystem;

/// London terminals tried first for underground-only stations.
const LONDON_INTERCHANGE_TERMINALS: [&str; 6] = [
    "London Waterloo",
    "London Liverpool Street",
    "London Victoria",
    "London Paddington",
    "London Kings Cross",
    "London Bridge",
];

const GLASGOW_INTERCHANGE_TERMINALS: [&str; 3] = ["Glasgow Central", "Glasgow Queen Street", "Partick"];

const TYNE_WEAR_INTERCHANGE_TERMINALS: [&str; 4] = ["Central Station", "Sunderland", "South Shields", "Airport"];

/// Keyword groups that pick the London terminal serving a direction.
const LONDON_DIRECTIONS: [(&[&str], &str); 4] = [
    (
        &["farnborough", "basingstoke", "southampton", "woking", "guildford", "winchester"],
        "London Waterloo",
    ),
    (&["reading", "swindon", "bristol", "oxford", "bath"], "London Paddington"),
    (
        &["colchester", "chelmsford", "ipswich", "norwich", "cambridge"],
        "London Liverpool Street",
    ),
    (&["birmingham", "manchester", "leeds", "york", "newcastle"], "London Euston"),
];

/// Terminal lookups over a classifier.
#[derive(Debug, Clone, Copy)]
pub struct TerminalManager<'a> {
    classifier: &'a StationClassifier,
}

impl<'a> TerminalManager<'a> {
    pub fn new(classifier: &'a StationClassifier) -> Self {
        Self { classifier }
    }

    /// Candidate national-rail terminals for leaving a station's system,
    /// in order of preference.
    pub fn nearest_terminals(&self, station: &str, data: &dyn RailwayData) -> Vec<String> {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        match self.classifier.underground_system(station) {
            None => owned(&LONDON_TERMINALS[..6]),
            Some(UndergroundSystem::London) if self.classifier.is_underground_only(station, data) => {
                owned(&LONDON_INTERCHANGE_TERMINALS)
            }
            Some(UndergroundSystem::London) => owned(&PRIMARY_LONDON_TERMINALS),
            Some(UndergroundSystem::Glasgow) => owned(&GLASGOW_INTERCHANGE_TERMINALS),
            Some(UndergroundSystem::TyneWear) => owned(&TYNE_WEAR_INTERCHANGE_TERMINALS),
        }
    }

    /// Drop underground-only stations from a calling pattern, keeping
    /// everything on national rail and every terminal.
    pub fn filter_underground_stations_from_path(&self, path: &[String], data: &dyn RailwayData) -> Vec<String> {
        path.iter()
            .filter(|station| {
                let keep = !self.classifier.is_underground_station(station)
                    || self.classifier.is_terminal_station(station)
                    || self.classifier.is_mixed(station, data);
                if !keep {
                    debug!(station = %station, "Filtered underground-only station from path");
                }
                keep
            })
            .cloned()
            .collect()
    }
}

/// The national-rail terminus where a journey to or from `rail_station`
/// should join an underground system.
pub fn best_terminus_for_system(rail_station: &str, system: UndergroundSystem) -> &'static str {
    match system {
        UndergroundSystem::London => best_london_terminus(rail_station),
        UndergroundSystem::Glasgow => "Glasgow Central",
        UndergroundSystem::TyneWear => "Newcastle",
    }
}

/// The London terminal facing the direction of a national-rail station.
pub fn best_london_terminus(rail_station: &str) -> &'static str {
    let lower = rail_station.to_lowercase();
    LONDON_DIRECTIONS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or("London Waterloo", |(_, terminal)| *terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StationLineRepository;
    use crate::domain::RailwayLine;
    use crate::underground::UndergroundNetworks;

    fn classifier() -> StationClassifier {
        StationClassifier::new(
            UndergroundNetworks::new()
                .with_system(UndergroundSystem::London, &["Oxford Circus", "Bank", "Waterloo"], &[])
                .with_system(UndergroundSystem::Glasgow, &["St Enoch", "Hillhead"], &["St Enoch"]),
        )
    }

    fn repo() -> StationLineRepository {
        let line = RailwayLine::new("South Western Main Line", ["London Waterloo", "Woking"]).unwrap();
        StationLineRepository::from_lines(vec![line])
    }

    #[test]
    fn london_terminus_by_direction() {
        assert_eq!(best_london_terminus("Farnborough (Main)"), "London Waterloo");
        assert_eq!(best_london_terminus("Reading"), "London Paddington");
        assert_eq!(best_london_terminus("Cambridge North"), "London Liverpool Street");
        assert_eq!(best_london_terminus("Manchester Piccadilly"), "London Euston");
        assert_eq!(best_london_terminus("Brighton"), "London Waterloo");

        assert_eq!(best_terminus_for_system("Preston", UndergroundSystem::Glasgow), "Glasgow Central");
        assert_eq!(best_terminus_for_system("York", UndergroundSystem::TyneWear), "Newcastle");
        assert_eq!(best_terminus_for_system("Bath Spa", UndergroundSystem::London), "London Paddington");
    }

    #[test]
    fn nearest_terminals_by_system() {
        let c = classifier();
        let repo = repo();
        let terminals = TerminalManager::new(&c);

        assert_eq!(terminals.nearest_terminals("Oxford Circus", &repo).len(), 6);
        assert_eq!(
            terminals.nearest_terminals("London Waterloo", &repo),
            PRIMARY_LONDON_TERMINALS.map(String::from).to_vec()
        );
        assert_eq!(terminals.nearest_terminals("Hillhead", &repo)[0], "Glasgow Central");
        assert_eq!(terminals.nearest_terminals("Woking", &repo)[5], "London St Pancras");
    }

    #[test]
    fn path_filter_keeps_rail_and_terminals() {
        let c = classifier();
        let repo = repo();
        let path: Vec<String> = ["Woking", "London Waterloo", "Bank", "Oxford Circus"]
            .map(String::from)
            .to_vec();

        assert_eq!(
            TerminalManager::new(&c).filter_underground_stations_from_path(&path, &repo),
            vec!["Woking", "London Waterloo"]
        );
    }
}
