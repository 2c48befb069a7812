//! Underground systems as black boxes.
//!
//! The London Underground, Glasgow Subway and Tyne and Wear Metro are never
//! searched station by station. A journey across one is a single macro
//! segment whose length and duration are estimated. This module decides
//! when that applies and builds the composite routes that join macro
//! segments to national rail.

mod classifier;
mod decision;
mod estimator;
mod factory;
mod geography;
mod systems;
mod terminals;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error};

use crate::data::RailwayData;
use crate::graph::NetworkGraphBuilder;

pub use classifier::StationClassifier;
pub use decision::BlackBoxDecision;
pub use estimator::JourneyEstimator;
pub use factory::RouteFactory;
pub use geography::{
    Region, SCOTTISH_TERMINALS, cross_country_regions, find_best_terminus, is_cross_country_route,
    is_known_cross_country_pair, station_region,
};
pub use systems::{SystemStations, UNDERGROUND_FILE, UndergroundNetworks, UndergroundSystem};
pub use terminals::{TerminalManager, best_london_terminus, best_terminus_for_system};

/// Entry point for underground-aware routing.
///
/// Owns the loaded systems. Everything else is borrowed per query.
#[derive(Debug, Clone, Default)]
pub struct UndergroundRoutingHandler {
    classifier: StationClassifier,
    estimator: JourneyEstimator,
}

impl UndergroundRoutingHandler {
    pub fn new(networks: UndergroundNetworks) -> Self {
        Self {
            classifier: StationClassifier::new(networks),
            estimator: JourneyEstimator::new(),
        }
    }

    /// Load the systems file from a data directory.
    ///
    /// A missing or unreadable file gives a handler with no systems, so rail
    /// routing still works without black-box support.
    pub fn load(data_dir: &Path) -> Self {
        match UndergroundNetworks::load(data_dir) {
            Ok(networks) => Self::new(networks),
            Err(err) => {
                error!(error = %err, "Could not load underground systems; black-box routing disabled");
                Self::new(UndergroundNetworks::new())
            }
        }
    }

    pub fn classifier(&self) -> &StationClassifier {
        &self.classifier
    }

    pub fn estimator(&self) -> &JourneyEstimator {
        &self.estimator
    }

    pub fn terminals(&self) -> TerminalManager<'_> {
        TerminalManager::new(&self.classifier)
    }

    /// A route factory for one query.
    pub fn factory<'a>(
        &'a self,
        data: &'a dyn RailwayData,
        spans: &'a NetworkGraphBuilder,
        interchange_penalty_mins: u32,
    ) -> RouteFactory<'a> {
        RouteFactory::new(&self.classifier, data, spans, interchange_penalty_mins)
    }

    pub fn get_underground_system(&self, station: &str) -> Option<UndergroundSystem> {
        self.classifier.underground_system(station)
    }

    pub fn is_underground_station(&self, station: &str) -> bool {
        self.classifier.is_underground_station(station)
    }

    pub fn is_underground_only_station(&self, station: &str, data: &dyn RailwayData) -> bool {
        self.classifier.is_underground_only(station, data)
    }

    pub fn is_mixed_station(&self, station: &str, data: &dyn RailwayData) -> bool {
        self.classifier.is_mixed(station, data)
    }

    pub fn is_terminal_station(&self, station: &str) -> bool {
        self.classifier.is_terminal_station(station)
    }

    pub fn get_system_terminals(&self, system: UndergroundSystem) -> Vec<String> {
        self.classifier.system_terminals(system)
    }

    /// How a journey relates to the underground systems.
    pub fn decide(&self, from: &str, to: &str, data: &dyn RailwayData) -> BlackBoxDecision {
        let decision = BlackBoxDecision::decide(from, to, &self.classifier, data);
        debug!(from = %from, to = %to, decision = %decision, "Black-box decision");
        decision
    }

    /// Whether a journey is answered with a macro segment instead of graph
    /// search.
    pub fn should_use_black_box_routing(&self, from: &str, to: &str, data: &dyn RailwayData) -> bool {
        self.decide(from, to, data).uses_black_box()
    }

    /// Station counts for each loaded system.
    pub fn get_underground_statistics(&self, data: &dyn RailwayData) -> UndergroundStatistics {
        let systems: BTreeMap<String, SystemStatistics> = self
            .classifier
            .networks()
            .systems()
            .map(|(system, stations)| {
                let mixed = stations
                    .stations
                    .iter()
                    .filter(|s| data.validate_station_exists(s))
                    .count();
                let terminals = self
                    .classifier
                    .system_terminals(system)
                    .iter()
                    .filter(|t| data.validate_station_exists(t))
                    .count();
                let stats = SystemStatistics {
                    name: system.system_name().to_string(),
                    total_stations: stations.stations.len(),
                    underground_only_stations: stations.stations.len() - mixed,
                    mixed_stations: mixed,
                    terminals,
                };
                (system.key().to_string(), stats)
            })
            .collect();

        UndergroundStatistics {
            total_stations: systems.values().map(|s| s.total_stations).sum(),
            underground_only_stations: systems.values().map(|s| s.underground_only_stations).sum(),
            systems,
        }
    }
}

/// Counts for one underground system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatistics {
    pub name: String,
    pub total_stations: usize,
    pub underground_only_stations: usize,
    pub mixed_stations: usize,
    /// Terminals that national rail serves
    pub terminals: usize,
}

/// Counts for every loaded system, keyed by system key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndergroundStatistics {
    pub total_stations: usize,
    pub underground_only_stations: usize,
    pub systems: BTreeMap<String, SystemStatistics>,
}
