//! The route service: every route query the engine answers.
//!
//! A query is first checked against the underground shortcuts (cross-country
//! composites, black-box segments, terminus bridging). Anything left is a
//! graph search over national rail. Answers are cached per query until the
//! cache is cleared or the data refreshed.

mod cache;
mod convert;
mod queries;
mod rank;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::data::{DataError, LoadSummary, RailwayData, StationLineRepository, StationNameNormalizer};
use crate::domain::{Route, RouteSegment, ServicePattern};
use crate::graph::NetworkGraphBuilder;
use crate::planner::{EngineConfig, Objective, PathNode, PathfindingAlgorithm, RoutePreferences};
use crate::underground::{
    BlackBoxDecision, RouteFactory, UndergroundRoutingHandler, UndergroundStatistics, UndergroundSystem,
    best_terminus_for_system,
};

pub use cache::{CacheKey, PreferenceKey, RouteCache};
pub use convert::{ConversionError, RouteConverter};
pub use queries::{CircularSearch, circular_paths, reachable_destinations};
pub use rank::{deduplicate, rank_routes, route_similarity, routes_similar};

/// How many routes the station-avoiding search considers.
const DEFAULT_ALTERNATIVES: usize = 3;

/// Counts describing the network and the service's work so far.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStatistics {
    pub total_stations: usize,
    /// Undirected station-to-station links
    pub total_connections: usize,
    pub total_lines: usize,
    pub average_connections_per_station: f64,
    pub underground: UndergroundStatistics,
    pub cached_queries: usize,
    pub searches: usize,
    pub data_loaded_at: DateTime<Utc>,
}

/// Answers route queries over one set of network data.
///
/// Queries take `&mut self`: the graph is built lazily and answers are
/// cached. Share a service between tasks behind a lock.
#[derive(Debug)]
pub struct RouteService<D> {
    data: D,
    config: EngineConfig,
    normalizer: StationNameNormalizer,
    graph_builder: NetworkGraphBuilder,
    pathfinder: PathfindingAlgorithm,
    underground: UndergroundRoutingHandler,
    /// Where the underground systems were loaded from, for refreshes
    underground_dir: Option<PathBuf>,
    converter: RouteConverter,
    cache: RouteCache,
    searches: usize,
}

impl RouteService<StationLineRepository> {
    /// Load the network and underground systems from a data directory.
    pub fn load(data_dir: impl AsRef<Path>, config: EngineConfig) -> Result<Self, DataError> {
        let data_dir = data_dir.as_ref();
        let data = StationLineRepository::load(data_dir)?;
        let underground = UndergroundRoutingHandler::load(data_dir);
        Ok(Self::new(data, underground, config).with_underground_dir(data_dir))
    }
}

impl<D: RailwayData> RouteService<D> {
    pub fn new(data: D, underground: UndergroundRoutingHandler, config: EngineConfig) -> Self {
        let normalizer = build_normalizer(&data, &underground);
        Self {
            graph_builder: NetworkGraphBuilder::new(&config),
            pathfinder: PathfindingAlgorithm::new(config.clone()),
            cache: RouteCache::new(config.max_cached_routes),
            data,
            config,
            normalizer,
            underground,
            underground_dir: None,
            converter: RouteConverter::new(),
            searches: 0,
        }
    }

    /// Reload the underground systems from `dir` on each refresh.
    pub fn with_underground_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.underground_dir = Some(dir.into());
        self
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn underground(&self) -> &UndergroundRoutingHandler {
        &self.underground
    }

    /// Number of graph searches run so far.
    pub fn search_count(&self) -> usize {
        self.searches
    }

    /// Number of queries with cached answers.
    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    /// The canonical name for a loosely typed station name.
    pub fn normalize_station(&self, name: &str) -> String {
        self.normalizer.normalize(name)
    }

    /// The best route between two stations, by journey time.
    ///
    /// Returns `None` when the ends are the same station, when no route
    /// exists, or when the best route needs more than `max_changes` changes.
    pub fn calculate_route(
        &mut self,
        from: &str,
        to: &str,
        max_changes: Option<u32>,
        preferences: Option<&RoutePreferences>,
    ) -> Option<Route> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        if from == to {
            debug!(station = %from, "Origin and destination are the same station");
            return None;
        }

        let key = CacheKey::new(&from, &to, preferences);
        let route = match self.cache.get(&key).and_then(<[Route]>::first) {
            Some(route) => {
                debug!(from = %from, to = %to, "Route cache hit");
                route.clone()
            }
            None => {
                let route = match self.composite_route(&from, &to, preferences) {
                    Some(route) => route,
                    None => self.searched_route(&from, &to, Objective::Time, preferences)?,
                };
                info!(
                    from = %from,
                    to = %to,
                    minutes = route.total_journey_time_minutes(),
                    changes = route.changes_required(),
                    "Calculated route"
                );
                // The change limit is not part of the key
                self.cache.insert(key, vec![route.clone()]);
                route
            }
        };

        if exceeds_changes(&route, max_changes) {
            warn!(
                from = %from,
                to = %to,
                changes = route.changes_required(),
                max_changes = ?max_changes,
                "Route needs too many changes"
            );
            return None;
        }
        Some(route)
    }

    /// Up to `max_routes` distinct routes, best first.
    ///
    /// Searches by time, then changes, then distance, dropping routes that
    /// pass through nearly the same stations as one already found. The
    /// cache keeps every distinct route found; `max_changes` filters what is
    /// returned.
    pub fn calculate_multiple_routes(
        &mut self,
        from: &str,
        to: &str,
        max_routes: usize,
        max_changes: Option<u32>,
        preferences: Option<&RoutePreferences>,
    ) -> Vec<Route> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        if from == to || max_routes == 0 {
            return Vec::new();
        }

        let key = CacheKey::new(&from, &to, preferences);
        if let Some(cached) = self.cache.get(&key)
            && cached.len() >= max_routes
        {
            let routes = within_changes(cached, max_changes, max_routes);
            if routes.len() == max_routes {
                debug!(from = %from, to = %to, "Route cache hit");
                return routes;
            }
        }

        if let Some(route) = self.composite_route(&from, &to, preferences) {
            self.cache.insert(key, vec![route.clone()]);
            return within_changes(&[route], max_changes, max_routes);
        }

        let found: Vec<Route> = Objective::SEARCH_ORDER
            .into_iter()
            .filter_map(|objective| self.searched_route(&from, &to, objective, preferences))
            .collect();
        let routes = rank_routes(deduplicate(found, self.config.similarity_threshold));
        info!(from = %from, to = %to, found = routes.len(), "Calculated alternative routes");

        let selected = within_changes(&routes, max_changes, max_routes);
        self.cache.insert(key, routes);
        selected
    }

    pub fn get_fastest_route(&mut self, from: &str, to: &str, preferences: Option<&RoutePreferences>) -> Option<Route> {
        self.route_by(from, to, Objective::Time, preferences)
    }

    pub fn get_shortest_route(&mut self, from: &str, to: &str, preferences: Option<&RoutePreferences>) -> Option<Route> {
        self.route_by(from, to, Objective::Distance, preferences)
    }

    pub fn get_route_with_fewest_changes(
        &mut self,
        from: &str,
        to: &str,
        preferences: Option<&RoutePreferences>,
    ) -> Option<Route> {
        self.route_by(from, to, Objective::Changes, preferences)
    }

    /// Journey time of the fastest route, in minutes.
    pub fn get_journey_time(&mut self, from: &str, to: &str, preferences: Option<&RoutePreferences>) -> Option<u32> {
        self.get_fastest_route(from, to, preferences)
            .map(|route| route.total_journey_time_minutes())
    }

    /// Length of the shortest route, in kilometres.
    pub fn get_distance(&mut self, from: &str, to: &str, preferences: Option<&RoutePreferences>) -> Option<f64> {
        self.get_shortest_route(from, to, preferences)
            .map(|route| route.total_distance_km())
    }

    /// The best route to `via` joined to the best route on from there.
    ///
    /// Empty when either leg has no route, including when `via` is one of
    /// the ends.
    pub fn find_routes_via_station(
        &mut self,
        from: &str,
        to: &str,
        via: &str,
        preferences: Option<&RoutePreferences>,
    ) -> Vec<Route> {
        let Some(first) = self.calculate_route(from, via, None, preferences) else {
            return Vec::new();
        };
        let Some(second) = self.calculate_route(via, to, None, preferences) else {
            return Vec::new();
        };

        let continues_line = first.segments().last().map(|s| &s.line_name)
            == second.segments().first().map(|s| &s.line_name);
        let penalty = if continues_line { 0 } else { self.config.interchange_penalty_mins };
        match self.converter.create_interchange_route(&first, &second, penalty) {
            Ok(route) => vec![route],
            Err(e) => {
                warn!(via = %via, error = %e, "Could not join routes at via station");
                Vec::new()
            }
        }
    }

    /// Alternative routes that never call at `avoid` on the way.
    pub fn find_routes_avoiding_station(
        &mut self,
        from: &str,
        to: &str,
        avoid: &str,
        preferences: Option<&RoutePreferences>,
    ) -> Vec<Route> {
        let avoid = self.normalizer.normalize(avoid);
        self.calculate_multiple_routes(from, to, DEFAULT_ALTERNATIVES, None, preferences)
            .into_iter()
            .filter(|route| !route.intermediate_stations().contains(&avoid))
            .collect()
    }

    /// Direct routes on one named line. Empty unless the line serves both
    /// stations.
    pub fn find_routes_on_line(&self, from: &str, to: &str, line_name: &str) -> Vec<Route> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        let Some(line) = self.data.get_railway_line_by_name(line_name) else {
            debug!(line = %line_name, "Unknown line");
            return Vec::new();
        };
        if from == to || !line.serves(&from) || !line.serves(&to) {
            return Vec::new();
        }

        self.direct_routes(&from, &to)
            .into_iter()
            .filter(|route| route.segments().iter().any(|s| s.line_name == line_name))
            .collect()
    }

    /// Up to `max_alternatives` other routes between the same ends as
    /// `route`, best first. Routes through exactly the same stations as
    /// `route` are left out.
    pub fn get_route_alternatives(
        &mut self,
        route: &Route,
        max_alternatives: usize,
        preferences: Option<&RoutePreferences>,
    ) -> Vec<Route> {
        if max_alternatives == 0 {
            return Vec::new();
        }
        self.calculate_multiple_routes(
            route.from_station(),
            route.to_station(),
            max_alternatives + 1,
            None,
            preferences,
        )
        .into_iter()
        .filter(|other| other.full_path() != route.full_path())
        .take(max_alternatives)
        .collect()
    }

    /// One single-segment route for each line serving both stations.
    pub fn find_direct_routes(&self, from: &str, to: &str) -> Vec<Route> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        if from == to {
            return Vec::new();
        }
        self.direct_routes(&from, &to)
    }

    /// Two-leg routes through an interchange, fastest first.
    ///
    /// Each leg is a direct route; pairs whose legs share a line are left
    /// out since they are really direct routes.
    pub fn find_interchange_routes(&self, from: &str, to: &str) -> Vec<Route> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        if from == to {
            return Vec::new();
        }

        let mut routes = Vec::new();
        for interchange in self.interchanges_between(&from, &to) {
            let first_legs = self.direct_routes(&from, &interchange);
            let second_legs = self.direct_routes(&interchange, &to);
            for first in &first_legs {
                for second in &second_legs {
                    let first_lines = first.lines_used();
                    if second.lines_used().iter().any(|line| first_lines.contains(line)) {
                        continue;
                    }
                    match self
                        .converter
                        .create_interchange_route(first, second, self.config.interchange_penalty_mins)
                    {
                        Ok(route) => routes.push(route),
                        Err(e) => debug!(via = %interchange, error = %e, "Skipping interchange route"),
                    }
                }
            }
        }

        rank_routes(routes)
    }

    /// Interchange stations sharing a line with each end, ends excluded.
    pub fn get_interchange_stations(&self, from: &str, to: &str) -> Vec<String> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        self.interchanges_between(&from, &to)
    }

    /// Stations reachable within `max_changes` changes, sorted by name.
    pub fn get_possible_destinations(&mut self, from: &str, max_changes: u32) -> Vec<String> {
        let from = self.normalizer.normalize(from);
        let graph = self.graph_builder.build_network_graph(&self.data);
        let Some(start) = graph.resolve_station(&from) else {
            warn!(station = %from, "Unknown station for destination search");
            return Vec::new();
        };
        reachable_destinations(&graph, start, max_changes)
    }

    /// Up to five round trips from a station, none longer than
    /// `max_distance_km`.
    pub fn find_circular_routes(&mut self, station: &str, max_distance_km: f64) -> Vec<Route> {
        let station = self.normalizer.normalize(station);
        let graph = self.graph_builder.build_network_graph(&self.data);
        let Some(start) = graph.resolve_station(&station) else {
            warn!(station = %station, "Unknown station for circular route search");
            return Vec::new();
        };

        let search = CircularSearch {
            max_distance_km,
            interchange_penalty_mins: self.config.interchange_penalty_mins,
            max_routes: 5,
            max_expansions: self.config.max_nodes_explored,
        };
        let routes: Vec<Route> = circular_paths(&graph, start, search)
            .iter()
            .filter_map(|node| self.node_to_route(node))
            .collect();
        info!(station = %start, found = routes.len(), "Found circular routes");
        routes
    }

    /// Check a route against the loaded network.
    ///
    /// Underground and walking segments are not checked against lines.
    /// Returns whether the route is valid, with every problem found.
    pub fn validate_route(&self, route: &Route) -> (bool, Vec<String>) {
        let mut errors = Vec::new();

        for (label, station) in [("From", route.from_station()), ("To", route.to_station())] {
            if !self.data.validate_station_exists(station) && !self.underground.is_underground_station(station) {
                errors.push(format!("{label} station does not exist: {station}"));
            }
        }

        for (i, segment) in route.segments().iter().enumerate() {
            if segment.service_pattern != ServicePattern::NationalRail {
                continue;
            }
            match self.data.get_railway_line_by_name(&segment.line_name) {
                None => errors.push(format!("Segment {i}: Line does not exist: {}", segment.line_name)),
                Some(line) => {
                    for station in [&segment.from_station, &segment.to_station] {
                        if !line.serves(station) {
                            errors.push(format!(
                                "Segment {i}: Station {station} not on line {}",
                                segment.line_name
                            ));
                        }
                    }
                }
            }
        }

        for (i, pair) in route.segments().windows(2).enumerate() {
            if pair[0].to_station != pair[1].from_station {
                errors.push(format!(
                    "Segments {i} and {}: Not continuous - {} != {}",
                    i + 1,
                    pair[0].to_station,
                    pair[1].from_station
                ));
            }
        }

        (errors.is_empty(), errors)
    }

    /// Estimated fare in pounds.
    pub fn calculate_route_cost(&self, route: &Route) -> f64 {
        route.total_distance_km() * self.config.cost_per_km
            + f64::from(route.changes_required()) * self.config.cost_per_change
    }

    pub fn get_route_statistics(&mut self) -> RouteStatistics {
        let graph = self.graph_builder.build_network_graph(&self.data);
        let total_stations = graph.station_count();
        let total_connections = graph.connection_count();
        let average_connections_per_station = if total_stations == 0 {
            0.0
        } else {
            (2 * total_connections) as f64 / total_stations as f64
        };

        RouteStatistics {
            total_stations,
            total_connections,
            total_lines: self.data.load_railway_lines().len(),
            average_connections_per_station,
            underground: self.underground.get_underground_statistics(&self.data),
            cached_queries: self.cache.len(),
            searches: self.searches,
            data_loaded_at: self.data.loaded_at(),
        }
    }

    /// Forget cached answers and the built graph.
    pub fn clear_route_cache(&mut self) {
        self.cache.clear();
        self.graph_builder.clear_cache();
        info!("Route caches cleared");
    }

    /// Warm the cache for known station pairs. Returns how many pairs have
    /// a route.
    pub fn precompute_common_routes<S: AsRef<str>>(&mut self, pairs: &[(S, S)]) -> usize {
        info!(pairs = pairs.len(), "Precomputing routes");
        let mut found = 0;
        for (from, to) in pairs {
            let (from, to) = (from.as_ref(), to.as_ref());
            if self.calculate_route(from, to, None, None).is_some() {
                debug!(from = %from, to = %to, "Precomputed route");
                found += 1;
            } else {
                warn!(from = %from, to = %to, "No route to precompute");
            }
        }
        info!(found, cached = self.cache.len(), "Precomputation complete");
        found
    }

    /// Reload the network (and the underground systems, if loaded from a
    /// directory) and drop everything derived from the old data.
    pub fn refresh_data(&mut self) -> Result<LoadSummary, DataError> {
        let summary = self.data.refresh_data()?;
        if let Some(dir) = &self.underground_dir {
            self.underground = UndergroundRoutingHandler::load(dir);
        }
        self.normalizer = build_normalizer(&self.data, &self.underground);
        self.cache.clear();
        self.graph_builder.clear_cache();
        info!(
            lines = summary.lines,
            stations = summary.stations,
            "Route service data refreshed"
        );
        Ok(summary)
    }

    fn factory(&self) -> RouteFactory<'_> {
        self.underground
            .factory(&self.data, &self.graph_builder, self.config.interchange_penalty_mins)
    }

    /// A route built from underground shortcuts, if the journey calls for
    /// one.
    fn composite_route(&mut self, from: &str, to: &str, preferences: Option<&RoutePreferences>) -> Option<Route> {
        let decision = {
            let factory = self.factory();
            if let Some(route) = factory.cross_country_route(from, to) {
                return Some(route);
            }
            self.underground.decide(from, to, &self.data)
        };

        match decision {
            BlackBoxDecision::SameSystem(system) => self.factory().black_box_route(from, to, system),
            BlackBoxDecision::DifferentSystems {
                from: from_system,
                to: to_system,
            } => self.factory().multi_system_route(from, to, from_system, to_system),
            BlackBoxDecision::DestinationUndergroundOnly(system) => {
                self.rail_then_underground(from, to, system, preferences)
            }
            BlackBoxDecision::OriginUndergroundOnly(system) => {
                self.underground_then_rail(from, to, system, preferences)
            }
            BlackBoxDecision::PreferNationalRail
            | BlackBoxDecision::DestinationServedByRail(_)
            | BlackBoxDecision::NotApplicable => None,
        }
    }

    /// National rail to the system's terminus, then one macro segment.
    fn rail_then_underground(
        &mut self,
        from: &str,
        to: &str,
        system: UndergroundSystem,
        preferences: Option<&RoutePreferences>,
    ) -> Option<Route> {
        let terminus = best_terminus_for_system(from, system);
        if from == terminus {
            return self.factory().black_box_route(from, to, system);
        }

        let node = self.search(from, terminus, Objective::Time, preferences)?;
        let rail = self.node_to_route(&node)?;
        let hop = self.factory().underground_segment(rail.to_station(), to, system);
        attach_hop(&rail, hop, HopEnd::End)
    }

    /// One macro segment to the system's terminus, then national rail.
    fn underground_then_rail(
        &mut self,
        from: &str,
        to: &str,
        system: UndergroundSystem,
        preferences: Option<&RoutePreferences>,
    ) -> Option<Route> {
        let terminus = best_terminus_for_system(to, system);
        if to == terminus {
            return self.factory().black_box_route(from, to, system);
        }

        let node = self.search(terminus, to, Objective::Time, preferences)?;
        let rail = self.node_to_route(&node)?;
        let hop = self.factory().underground_segment(from, rail.from_station(), system);
        attach_hop(&rail, hop, HopEnd::Start)
    }

    /// Best route for one objective, shortcuts first.
    fn route_by(
        &mut self,
        from: &str,
        to: &str,
        objective: Objective,
        preferences: Option<&RoutePreferences>,
    ) -> Option<Route> {
        let from = self.normalizer.normalize(from);
        let to = self.normalizer.normalize(to);
        if from == to {
            return None;
        }
        self.composite_route(&from, &to, preferences)
            .or_else(|| self.searched_route(&from, &to, objective, preferences))
    }

    /// Graph search, converted and with underground legs collapsed.
    fn searched_route(
        &mut self,
        from: &str,
        to: &str,
        objective: Objective,
        preferences: Option<&RoutePreferences>,
    ) -> Option<Route> {
        let node = self.search(from, to, objective, preferences)?;
        let route = self.node_to_route(&node)?;
        Some(self.factory().enhance_route_with_black_box(route))
    }

    fn search(
        &mut self,
        from: &str,
        to: &str,
        objective: Objective,
        preferences: Option<&RoutePreferences>,
    ) -> Option<PathNode> {
        let graph = self.graph_builder.build_network_graph(&self.data);
        self.searches += 1;
        self.pathfinder
            .dijkstra_shortest_path(from, to, &graph, &self.data, objective, preferences)
    }

    fn node_to_route(&self, node: &PathNode) -> Option<Route> {
        match self.converter.path_to_route(node) {
            Ok(route) => Some(route),
            Err(e) => {
                error!(station = %node.station, error = %e, "Failed to convert path to route");
                None
            }
        }
    }

    fn direct_routes(&self, from: &str, to: &str) -> Vec<Route> {
        self.data
            .get_common_lines(from, to)
            .iter()
            .filter_map(|name| {
                let line = self.data.get_railway_line_by_name(name)?;
                let (km, mins) = self.graph_builder.span(&self.data, line, from, to)?;
                self.converter.create_direct_route(from, to, name, mins, km).ok()
            })
            .collect()
    }

    fn interchanges_between(&self, from: &str, to: &str) -> Vec<String> {
        let from_lines = self.data.get_lines_serving_station(from);
        let to_lines = self.data.get_lines_serving_station(to);

        self.data
            .get_interchange_stations()
            .into_iter()
            .filter(|station| station.name != from && station.name != to)
            .filter(|station| {
                let lines = self.data.get_lines_serving_station(&station.name);
                lines.iter().any(|l| from_lines.contains(l)) && lines.iter().any(|l| to_lines.contains(l))
            })
            .map(|station| station.name.clone())
            .collect()
    }
}

fn build_normalizer(data: &dyn RailwayData, underground: &UndergroundRoutingHandler) -> StationNameNormalizer {
    let underground_names = underground
        .classifier()
        .networks()
        .systems()
        .flat_map(|(_, stations)| stations.stations.iter().map(String::as_str));
    StationNameNormalizer::new(data.get_all_station_names().into_iter().chain(underground_names))
}

fn exceeds_changes(route: &Route, max_changes: Option<u32>) -> bool {
    max_changes.is_some_and(|max| route.changes_required() > max)
}

/// The first `max_routes` routes within the change limit.
fn within_changes(routes: &[Route], max_changes: Option<u32>, max_routes: usize) -> Vec<Route> {
    routes
        .iter()
        .filter(|route| !exceeds_changes(route, max_changes))
        .take(max_routes)
        .cloned()
        .collect()
}

/// Which end of a rail route an underground hop goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HopEnd {
    Start,
    End,
}

/// A rail route with an underground hop added at one end. No interchange
/// time is added at the join.
fn attach_hop(rail: &Route, hop: RouteSegment, end: HopEnd) -> Option<Route> {
    let distance_km = rail.total_distance_km() + hop.distance_km;
    let minutes = rail.total_journey_time_minutes() + hop.journey_time_minutes;

    let (segments, full_path) = match end {
        HopEnd::Start => {
            let mut full_path = vec![hop.from_station.clone()];
            full_path.extend(rail.full_path().iter().cloned());
            let mut segments = vec![hop];
            segments.extend(rail.segments().iter().cloned());
            (segments, full_path)
        }
        HopEnd::End => {
            let mut full_path = rail.full_path().to_vec();
            full_path.push(hop.to_station.clone());
            let mut segments = rail.segments().to_vec();
            segments.push(hop);
            (segments, full_path)
        }
    };

    let from = segments.first()?.from_station.clone();
    let to = segments.last()?.to_station.clone();
    match Route::new(from, to, segments, distance_km, minutes, full_path) {
        Ok(route) => Some(route),
        Err(e) => {
            error!(error = %e, "Failed to join underground segment to rail route");
            None
        }
    }
}
