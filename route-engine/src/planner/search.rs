//! Dijkstra search over the network graph.
//!
//! Nodes are whole partial routes, so the path, lines and change count
//! travel with each queue entry. The queue pops nodes in the objective's
//! order (time, changes, distance for the time objective). A station is
//! settled the first time it is popped; a neighbour is only re-queued when
//! its weight, which carries the routing preferences, improves.

use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::data::RailwayData;
use crate::graph::NetworkGraph;

use super::config::{EngineConfig, Objective, RoutePreferences};
use super::node::{PathNode, QueueEntry};
use super::scoring::SearchContext;

/// Shortest-path search under one of the three objectives.
#[derive(Debug, Clone)]
pub struct PathfindingAlgorithm {
    config: EngineConfig,
}

impl PathfindingAlgorithm {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Find the best path from `start` to `end`.
    ///
    /// Both names are resolved against the graph first. Returns `None` if
    /// either is unknown, if no path exists, or if the exploration cap is
    /// reached.
    pub fn dijkstra_shortest_path(
        &self,
        start: &str,
        end: &str,
        graph: &NetworkGraph,
        data: &dyn RailwayData,
        objective: Objective,
        preferences: Option<&RoutePreferences>,
    ) -> Option<PathNode> {
        let Some(start) = graph.resolve_station(start) else {
            warn!(station = %start, "Start station not found in network graph");
            return None;
        };
        let Some(end) = graph.resolve_station(end) else {
            warn!(station = %end, "End station not found in network graph");
            return None;
        };

        let ctx = SearchContext::new(start, end, data, objective, preferences);
        debug!(start = %start, end = %end, objective = %objective, "Starting search");

        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry {
            objective,
            node: PathNode::origin(start),
        });
        let mut visited: HashSet<String> = HashSet::new();
        let mut best: HashMap<String, f64> = HashMap::from([(start.to_string(), 0.0)]);
        let mut nodes_explored = 0usize;

        while let Some(QueueEntry { node, .. }) = queue.pop() {
            nodes_explored += 1;
            if let Some(cap) = self.config.max_nodes_explored
                && nodes_explored > cap
            {
                warn!(start = %start, end = %end, cap, "Search exceeded exploration cap");
                return None;
            }

            if !visited.insert(node.station.clone()) {
                continue;
            }

            if node.station == end {
                info!(
                    start = %start,
                    end = %end,
                    nodes_explored,
                    time_minutes = node.time_minutes,
                    distance_km = node.distance_km,
                    changes = node.changes,
                    "Found path"
                );
                return Some(node);
            }

            for (next, connections) in graph.neighbors(&node.station) {
                if visited.contains(next) || !ctx.admits(&node, next) {
                    continue;
                }
                let Some(candidates) = ctx.candidates(&node, connections) else {
                    continue;
                };
                let Some(connection) = ctx.select_best_connection(&node, &candidates) else {
                    continue;
                };

                let next_node = node.extend(connection, self.config.interchange_penalty_mins);
                let weight = ctx.calculate_weight(&node, &next_node, connection);

                if best.get(next).is_none_or(|&known| weight < known) {
                    best.insert(next.to_string(), weight);
                    queue.push(QueueEntry {
                        objective,
                        node: next_node,
                    });
                }
            }
        }

        warn!(start = %start, end = %end, nodes_explored, "No path found");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{StationLineRepository, WalkingLink};
    use crate::domain::RailwayLine;
    use crate::graph::NetworkGraphBuilder;

    fn line(name: &str, stations: &[&str], times: &[u32]) -> RailwayLine {
        let mut line = RailwayLine::new(name, stations.iter().copied()).unwrap();
        for (pair, &mins) in stations.windows(2).zip(times) {
            line = line.with_journey_time(pair[0], pair[1], mins);
        }
        line
    }

    fn search(
        repo: &StationLineRepository,
        start: &str,
        end: &str,
        objective: Objective,
        prefs: Option<&RoutePreferences>,
    ) -> Option<PathNode> {
        let config = EngineConfig::default();
        let graph = NetworkGraphBuilder::new(&config).build_network_graph(repo);
        PathfindingAlgorithm::new(config).dijkstra_shortest_path(start, end, &graph, repo, objective, prefs)
    }

    #[test]
    fn single_line() {
        let repo = StationLineRepository::from_lines(vec![line("L1", &["A", "B", "C"], &[10, 10])]);
        let node = search(&repo, "A", "C", Objective::Time, None).unwrap();

        assert_eq!(node.path, vec!["A", "B", "C"]);
        assert_eq!(node.time_minutes, 20);
        assert_eq!(node.changes, 0);
    }

    #[test]
    fn change_of_line_costs_interchange() {
        let repo = StationLineRepository::from_lines(vec![
            line("L1", &["A", "B"], &[10]),
            line("L2", &["B", "C"], &[15]),
        ]);
        let node = search(&repo, "A", "C", Objective::Time, None).unwrap();

        assert_eq!(node.lines_used, vec!["L1", "L2"]);
        assert_eq!(node.changes, 1);
        assert_eq!(node.time_minutes, 30);
    }

    #[test]
    fn disconnected_lines() {
        let repo = StationLineRepository::from_lines(vec![
            line("L1", &["A", "B"], &[10]),
            line("L2", &["C", "D"], &[10]),
        ]);
        assert!(search(&repo, "A", "D", Objective::Time, None).is_none());
        assert!(search(&repo, "A", "Nowhere", Objective::Time, None).is_none());
    }

    #[test]
    fn resolves_london_prefix() {
        let repo = StationLineRepository::from_lines(vec![line(
            "South Western Main Line",
            &["Woking", "London Waterloo"],
            &[25],
        )]);
        let node = search(&repo, "woking", "Waterloo", Objective::Time, None).unwrap();
        assert_eq!(node.path, vec!["Woking", "London Waterloo"]);
    }

    #[test]
    fn objectives_pick_different_routes() {
        // Fast with two changes, or slow with one
        let repo = StationLineRepository::from_lines(vec![
            line("Slow1", &["A", "X"], &[30]),
            line("Slow2", &["X", "D"], &[30]),
            line("Fast1", &["A", "B"], &[5]),
            line("Fast2", &["B", "C"], &[5]),
            line("Fast3", &["C", "D"], &[5]),
        ]);

        let fastest = search(&repo, "A", "D", Objective::Time, None).unwrap();
        assert_eq!(fastest.path, vec!["A", "B", "C", "D"]);
        assert_eq!(fastest.time_minutes, 25);
        assert_eq!(fastest.changes, 2);

        let fewest = search(&repo, "A", "D", Objective::Changes, None).unwrap();
        assert_eq!(fewest.path, vec!["A", "X", "D"]);
        assert_eq!(fewest.changes, 1);
    }

    #[test]
    fn common_line_keeps_search_on_it() {
        // A and D share L1, so the faster detour via L2 is never taken
        let repo = StationLineRepository::from_lines(vec![
            line("L1", &["A", "B", "C", "D"], &[10, 10, 10]),
            line("L2", &["A", "E", "D"], &[2, 2]),
        ]);
        let node = search(&repo, "A", "D", Objective::Time, None).unwrap();
        assert_eq!(node.path, vec!["A", "B", "C", "D"]);
        assert!(node.lines_used.iter().all(|l| l == "L1"));
    }

    #[test]
    fn skips_inner_london_on_short_journeys() {
        let repo = StationLineRepository::from_lines(vec![
            line("In", &["A", "London Vauxhall"], &[1]),
            line("Out", &["London Vauxhall", "B"], &[1]),
            line("Around", &["A", "C"], &[20]),
            line("Around 2", &["C", "B"], &[20]),
        ]);
        let node = search(&repo, "A", "B", Objective::Time, None).unwrap();
        assert_eq!(node.path, vec!["A", "C", "B"]);
    }

    #[test]
    fn avoid_walking_takes_the_train() {
        let repo = StationLineRepository::from_lines(vec![
            line("L1", &["A", "B"], &[10]),
            line("L2", &["B", "C"], &[30]),
        ])
        .with_walking_link(WalkingLink::new("B", "C", 5, 0.4));

        let prefs = RoutePreferences {
            avoid_walking: true,
            ..RoutePreferences::default()
        };
        let riding = search(&repo, "A", "C", Objective::Time, Some(&prefs)).unwrap();
        assert_eq!(riding.lines_used, vec!["L1", "L2"]);

        // Without the preference the shorter walk is taken
        let walking = search(&repo, "A", "C", Objective::Time, None).unwrap();
        assert_eq!(walking.lines_used, vec!["L1", "WALKING"]);
    }

    #[test]
    fn time_search_finishes_with_a_walk() {
        // A-B-(walk)-C takes 20 minutes; A-D-C is reached first but takes 35
        let repo = StationLineRepository::from_lines(vec![
            line("L1", &["A", "B"], &[10]),
            line("L2", &["A", "D"], &[5]),
            line("L3", &["D", "C"], &[25]),
        ])
        .with_walking_link(WalkingLink::new("B", "C", 5, 0.4));

        let node = search(&repo, "A", "C", Objective::Time, None).unwrap();
        assert_eq!(node.path, vec!["A", "B", "C"]);
        assert_eq!(node.time_minutes, 20);
    }

    #[test]
    fn exploration_cap() {
        let repo = StationLineRepository::from_lines(vec![line("L1", &["A", "B", "C", "D"], &[1, 1, 1])]);
        let config = EngineConfig::new(5, Some(2), 0.8);
        let graph = NetworkGraphBuilder::new(&config).build_network_graph(&repo);
        let algorithm = PathfindingAlgorithm::new(config);

        assert!(algorithm
            .dijkstra_shortest_path("A", "D", &graph, &repo, Objective::Time, None)
            .is_none());
        assert!(algorithm
            .dijkstra_shortest_path("A", "B", &graph, &repo, Objective::Time, None)
            .is_some());
    }
}
