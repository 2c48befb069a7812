//! Configuration for route search.

use std::fmt;

/// What a search optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Shortest total journey time (including interchange time)
    Time,
    /// Shortest total distance
    Distance,
    /// Fewest changes of train
    Changes,
}

impl Objective {
    /// Objectives in the order multi-route search tries them.
    pub const SEARCH_ORDER: [Objective; 3] = [Objective::Time, Objective::Changes, Objective::Distance];
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Objective::Time => "time",
            Objective::Distance => "distance",
            Objective::Changes => "changes",
        };
        f.write_str(label)
    }
}

/// Caller preferences for a route query.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePreferences {
    /// Prefer train connections over walks between stations.
    pub avoid_walking: bool,

    /// Penalize changes more heavily than their interchange time alone.
    pub prefer_direct: bool,

    /// Keep the search out of London except at the journey's endpoints.
    pub avoid_london: bool,

    /// Connections between stations not sharing a line count as walks
    /// beyond this distance.
    pub max_walking_distance_km: f64,
}

impl RoutePreferences {
    pub fn new(avoid_walking: bool, prefer_direct: bool, avoid_london: bool, max_walking_distance_km: f64) -> Self {
        Self {
            avoid_walking,
            prefer_direct,
            avoid_london,
            max_walking_distance_km,
        }
    }
}

impl Default for RoutePreferences {
    fn default() -> Self {
        Self {
            avoid_walking: false,
            prefer_direct: false,
            avoid_london: false,
            max_walking_distance_km: 0.1,
        }
    }
}

/// Engine-wide tuning parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minutes added for each change of line.
    pub interchange_penalty_mins: u32,

    /// Stop a search after visiting this many stations.
    /// `None` searches until the queue is exhausted.
    pub max_nodes_explored: Option<usize>,

    /// Intermediate-station Jaccard similarity at or above which two
    /// routes are treated as duplicates.
    pub similarity_threshold: f64,

    /// Speed used to derive missing hop times from distances (km/h).
    pub line_speed_kmh: f64,

    /// Hop time used when neither time nor location is known (minutes).
    pub default_hop_minutes: u32,

    /// Speed used to derive missing walk times (km/h).
    pub walking_speed_kmh: f64,

    /// Fare per kilometre for cost estimates (pounds).
    pub cost_per_km: f64,

    /// Fare surcharge per change for cost estimates (pounds).
    pub cost_per_change: f64,

    /// Largest number of routes cached per query.
    pub max_cached_routes: usize,
}

impl EngineConfig {
    /// Create a configuration with the given search parameters and default
    /// derivation and cost constants.
    pub fn new(interchange_penalty_mins: u32, max_nodes_explored: Option<usize>, similarity_threshold: f64) -> Self {
        Self {
            interchange_penalty_mins,
            max_nodes_explored,
            similarity_threshold,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interchange_penalty_mins: 5,
            max_nodes_explored: Some(10_000),
            similarity_threshold: 0.8,
            line_speed_kmh: 80.0,
            default_hop_minutes: 5,
            walking_speed_kmh: 5.0,
            cost_per_km: 0.20,
            cost_per_change: 2.0,
            max_cached_routes: 10,
        }
    }
}
