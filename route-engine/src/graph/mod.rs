//! Network graph construction.
//!
//! The graph maps each station to its neighbours and, per neighbour, the
//! candidate [`Connection`]s between them (one per line, plus walks and
//! through services). It is built once per data generation and shared
//! behind an [`Arc`] until explicitly cleared.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::data::RailwayData;
use crate::domain::RailwayLine;
use crate::planner::EngineConfig;

/// Line name used for walking connections.
pub const WALKING_LINE: &str = "WALKING";

/// One way of getting between two adjacent stations.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from_station: String,
    pub to_station: String,
    pub line: String,
    pub time_minutes: u32,
    pub distance_km: f64,

    /// A through service: staying aboard across a line boundary
    pub is_direct: bool,

    /// A walk rather than a train
    pub is_walking: bool,
}

impl Connection {
    /// A train connection on a line.
    pub fn rail(
        from: impl Into<String>,
        to: impl Into<String>,
        line: impl Into<String>,
        time_minutes: u32,
        distance_km: f64,
    ) -> Self {
        Self {
            from_station: from.into(),
            to_station: to.into(),
            line: line.into(),
            time_minutes,
            distance_km,
            is_direct: false,
            is_walking: false,
        }
    }

    /// A walk between two stations.
    pub fn walk(
        from: impl Into<String>,
        to: impl Into<String>,
        time_minutes: u32,
        distance_km: f64,
    ) -> Self {
        Self {
            is_walking: true,
            ..Self::rail(from, to, WALKING_LINE, time_minutes, distance_km)
        }
    }

    /// Mark as a through service.
    pub fn direct(mut self) -> Self {
        self.is_direct = true;
        self
    }

    /// The same connection travelled the other way.
    pub fn reversed(&self) -> Self {
        Self {
            from_station: self.to_station.clone(),
            to_station: self.from_station.clone(),
            ..self.clone()
        }
    }
}

/// Adjacency graph: station → neighbour → candidate connections.
///
/// Ordered maps keep neighbour iteration (and therefore search tie-breaks)
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkGraph {
    adjacency: BTreeMap<String, BTreeMap<String, Vec<Connection>>>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection in both directions.
    pub fn add_bidirectional(&mut self, connection: Connection) {
        let reverse = connection.reversed();
        self.add(reverse);
        self.add(connection);
    }

    fn add(&mut self, connection: Connection) {
        self.adjacency
            .entry(connection.from_station.clone())
            .or_default()
            .entry(connection.to_station.clone())
            .or_default()
            .push(connection);
    }

    /// Neighbours of a station with the connections reaching each.
    pub fn neighbors<'a>(&'a self, station: &str) -> impl Iterator<Item = (&'a str, &'a [Connection])> {
        self.adjacency
            .get(station)
            .into_iter()
            .flat_map(|n| n.iter().map(|(name, conns)| (name.as_str(), conns.as_slice())))
    }

    /// Connections from `a` directly to `b`.
    pub fn connections_between(&self, a: &str, b: &str) -> &[Connection] {
        self.adjacency
            .get(a)
            .and_then(|n| n.get(b))
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn contains_station(&self, station: &str) -> bool {
        self.adjacency.contains_key(station)
    }

    /// Station names in sorted order.
    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn station_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected connections.
    pub fn connection_count(&self) -> usize {
        let directed: usize = self
            .adjacency
            .values()
            .flat_map(|n| n.values())
            .map(Vec::len)
            .sum();
        directed / 2
    }

    /// Resolve a name against the stations in the graph.
    ///
    /// Tries exact, case-insensitive, without a "London " prefix and with
    /// one added.
    pub fn resolve_station(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.adjacency.get_key_value(name) {
            return Some(key.as_str());
        }

        let find_ci = |candidate: &str| {
            self.adjacency
                .keys()
                .find(|k| k.eq_ignore_ascii_case(candidate))
                .map(String::as_str)
        };

        find_ci(name)
            .or_else(|| {
                name.get(..7)
                    .filter(|head| head.eq_ignore_ascii_case("london "))
                    .and_then(|_| find_ci(&name[7..]))
            })
            .or_else(|| find_ci(&format!("London {name}")))
    }
}

/// Builds and memoizes the network graph.
#[derive(Debug, Clone)]
pub struct NetworkGraphBuilder {
    line_speed_kmh: f64,
    walking_speed_kmh: f64,
    default_hop_minutes: u32,
    cached: Option<Arc<NetworkGraph>>,
    builds: usize,
}

impl NetworkGraphBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            line_speed_kmh: config.line_speed_kmh,
            walking_speed_kmh: config.walking_speed_kmh,
            default_hop_minutes: config.default_hop_minutes,
            cached: None,
            builds: 0,
        }
    }

    /// The graph for the current data, built on first use.
    pub fn build_network_graph(&mut self, data: &dyn RailwayData) -> Arc<NetworkGraph> {
        if let Some(graph) = &self.cached {
            return Arc::clone(graph);
        }

        let graph = Arc::new(self.build(data));
        self.builds += 1;
        info!(
            stations = graph.station_count(),
            connections = graph.connection_count(),
            "Built network graph"
        );
        self.cached = Some(Arc::clone(&graph));
        graph
    }

    /// Drop the memoized graph so the next request rebuilds it.
    pub fn clear_cache(&mut self) {
        if self.cached.take().is_some() {
            debug!("Cleared network graph");
        }
    }

    /// How many times a graph has actually been built.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Whether a graph is currently memoized.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    fn build(&self, data: &dyn RailwayData) -> NetworkGraph {
        let mut graph = NetworkGraph::new();

        for line in data.load_railway_lines() {
            for (a, b) in line.adjacent_pairs() {
                let (km, mins) = self.hop_metrics(data, line, a, b);
                graph.add_bidirectional(Connection::rail(a, b, line.name(), mins, km));
            }

            for (a, b, mins) in line.direct_connections() {
                let km = self.span_distance(data, line, a, b);
                graph.add_bidirectional(Connection::rail(a, b, line.name(), mins, km).direct());
            }
        }

        for link in data.walking_links() {
            // A zero time means the source only knew the distance
            let minutes = match link.time_minutes {
                0 => ((link.distance_km / self.walking_speed_kmh) * 60.0).ceil().max(1.0) as u32,
                mins => mins,
            };
            graph.add_bidirectional(Connection::walk(
                &link.from_station,
                &link.to_station,
                minutes,
                link.distance_km,
            ));
        }

        graph
    }

    /// Distance and time between two stations on a line.
    ///
    /// Recorded values win. Otherwise distance comes from coordinates and
    /// time from distance at line speed; with neither, the default hop time
    /// is used and distance is derived from it.
    pub fn hop_metrics(&self, data: &dyn RailwayData, line: &RailwayLine, a: &str, b: &str) -> (f64, u32) {
        let geo_km = station_distance(data, a, b);

        let minutes = line
            .journey_time(a, b)
            .or_else(|| geo_km.map(|km| ((km / self.line_speed_kmh) * 60.0).ceil().max(1.0) as u32))
            .unwrap_or(self.default_hop_minutes);

        let km = line
            .distance(a, b)
            .or(geo_km)
            .unwrap_or_else(|| f64::from(minutes) * self.line_speed_kmh / 60.0);

        (km, minutes)
    }

    /// Distance along a line between two (possibly non-adjacent) stations.
    pub fn span_distance(&self, data: &dyn RailwayData, line: &RailwayLine, a: &str, b: &str) -> f64 {
        self.span(data, line, a, b).map_or(0.0, |(km, _)| km)
    }

    /// Distance and time along a line between two stations, summing hops.
    pub fn span(&self, data: &dyn RailwayData, line: &RailwayLine, a: &str, b: &str) -> Option<(f64, u32)> {
        let (i, j) = (line.index_of(a)?, line.index_of(b)?);
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };

        let stations = line.stations();
        let totals = (lo..hi).fold((0.0, 0u32), |(km, mins), k| {
            let (hop_km, hop_mins) = self.hop_metrics(data, line, &stations[k], &stations[k + 1]);
            (km + hop_km, mins + hop_mins)
        });
        Some(totals)
    }
}

/// Great-circle distance between two stations, if both have coordinates.
fn station_distance(data: &dyn RailwayData, a: &str, b: &str) -> Option<f64> {
    let a = data.get_station_by_name(a)?.coordinates?;
    let b = data.get_station_by_name(b)?.coordinates?;
    Some(a.distance_km(&b))
}
