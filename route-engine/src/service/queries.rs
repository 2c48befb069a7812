//! Breadth-first queries over the network graph.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::graph::{Connection, NetworkGraph};
use crate::planner::PathNode;

/// Every station reachable from `from` within `max_changes` changes of line,
/// sorted by name. The origin itself is not included.
///
/// Boarding a line not used before counts as a change once a first line has
/// been boarded.
pub fn reachable_destinations(graph: &NetworkGraph, from: &str, max_changes: u32) -> Vec<String> {
    let mut reachable: BTreeSet<String> = BTreeSet::new();
    // Arriving on a different line can open up onward lines without a change
    let mut visited: HashSet<(String, u32, Option<String>)> = HashSet::new();
    let mut queue: VecDeque<(String, u32, BTreeSet<String>, Option<String>)> = VecDeque::new();
    queue.push_back((from.to_string(), 0, BTreeSet::new(), None));

    while let Some((station, changes, lines, last_line)) = queue.pop_front() {
        if !visited.insert((station.clone(), changes, last_line)) {
            continue;
        }
        if station != from {
            reachable.insert(station.clone());
        }

        for (neighbour, connections) in graph.neighbors(&station) {
            for connection in connections {
                let boards_new_line = !lines.is_empty() && !lines.contains(&connection.line);
                let next_changes = changes + u32::from(boards_new_line);
                if next_changes > max_changes
                    || visited.contains(&(neighbour.to_string(), next_changes, Some(connection.line.clone())))
                {
                    continue;
                }

                let mut next_lines = lines.clone();
                next_lines.insert(connection.line.clone());
                queue.push_back((neighbour.to_string(), next_changes, next_lines, Some(connection.line.clone())));
            }
        }
    }

    reachable.into_iter().collect()
}

/// Limits for a circular-route search.
#[derive(Debug, Clone, Copy)]
pub struct CircularSearch {
    pub max_distance_km: f64,
    pub interchange_penalty_mins: u32,
    pub max_routes: usize,
    /// Stop after expanding this many partial paths.
    pub max_expansions: Option<usize>,
}

/// Round trips from `station` back to itself.
///
/// Intermediate stations are never revisited and a loop needs at least two
/// other stations, so going out and back along one track is not a loop.
/// A loop and its reverse count once. Of several connections between the
/// same pair of stations, only the shortest is followed.
pub fn circular_paths(graph: &NetworkGraph, station: &str, search: CircularSearch) -> Vec<PathNode> {
    let mut found: Vec<PathNode> = Vec::new();
    let mut queue: VecDeque<PathNode> = VecDeque::new();
    queue.push_back(PathNode::origin(station));
    let mut expansions = 0usize;

    while let Some(node) = queue.pop_front() {
        if found.len() >= search.max_routes {
            break;
        }
        expansions += 1;
        if search.max_expansions.is_some_and(|cap| expansions > cap) {
            debug!(station = %station, expansions, "Circular route search hit its limit");
            break;
        }

        for (neighbour, connections) in graph.neighbors(&node.station) {
            let Some(connection) = shortest(connections) else {
                continue;
            };
            if node.distance_km + connection.distance_km > search.max_distance_km {
                continue;
            }

            if neighbour == station {
                if node.path.len() >= 3 {
                    let closed = node.extend(connection, search.interchange_penalty_mins);
                    if !found.iter().any(|f| is_reverse(f, &closed)) {
                        found.push(closed);
                        if found.len() >= search.max_routes {
                            break;
                        }
                    }
                }
                continue;
            }

            if !node.visits(neighbour) {
                queue.push_back(node.extend(connection, search.interchange_penalty_mins));
            }
        }
    }

    found
}

fn shortest(connections: &[Connection]) -> Option<&Connection> {
    connections
        .iter()
        .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
}

fn is_reverse(a: &PathNode, b: &PathNode) -> bool {
    a.path.len() == b.path.len() && a.path.iter().eq(b.path.iter().rev())
}
