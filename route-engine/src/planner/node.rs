//! Search state for the shortest-path search.

use std::cmp::Ordering;

use super::config::Objective;
use crate::graph::Connection;

/// A partial route: where the search has got to and how it got there.
///
/// `path[0]` is always the search origin, and `hops[i]` is the connection
/// taken from `path[i]` to `path[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub station: String,
    pub distance_km: f64,
    /// Includes interchange time.
    pub time_minutes: u32,
    pub changes: u32,
    pub path: Vec<String>,
    /// Line of each hop, in order.
    pub lines_used: Vec<String>,
    pub hops: Vec<Connection>,
}

impl PathNode {
    /// The node a search starts from.
    pub fn origin(station: impl Into<String>) -> Self {
        let station = station.into();
        Self {
            path: vec![station.clone()],
            station,
            distance_km: 0.0,
            time_minutes: 0,
            changes: 0,
            lines_used: Vec::new(),
            hops: Vec::new(),
        }
    }

    /// Line of the most recent hop.
    pub fn last_line(&self) -> Option<&str> {
        self.lines_used.last().map(String::as_str)
    }

    /// Whether taking `connection` next would be a change of train.
    pub fn is_change(&self, connection: &Connection) -> bool {
        self.last_line()
            .is_some_and(|last| last != connection.line && !connection.is_direct)
    }

    /// The node reached by taking `connection` from here.
    ///
    /// A change of line that isn't a through service costs a change and
    /// `interchange_penalty_mins` extra minutes.
    pub fn extend(&self, connection: &Connection, interchange_penalty_mins: u32) -> PathNode {
        let mut changes = self.changes;
        let mut time_minutes = self.time_minutes + connection.time_minutes;
        if self.is_change(connection) {
            changes += 1;
            time_minutes += interchange_penalty_mins;
        }

        let mut path = self.path.clone();
        path.push(connection.to_station.clone());
        let mut lines_used = self.lines_used.clone();
        lines_used.push(connection.line.clone());
        let mut hops = self.hops.clone();
        hops.push(connection.clone());

        PathNode {
            station: connection.to_station.clone(),
            distance_km: self.distance_km + connection.distance_km,
            time_minutes,
            changes,
            path,
            lines_used,
            hops,
        }
    }

    /// Whether the path already passes through a station.
    pub fn visits(&self, station: &str) -> bool {
        self.path.iter().any(|s| s == station)
    }

    /// Compare by the objective's key order: time is (time, changes,
    /// distance); distance and changes lead with their own measure.
    pub fn cmp_for(&self, other: &PathNode, objective: Objective) -> Ordering {
        let time = self.time_minutes.cmp(&other.time_minutes);
        let changes = self.changes.cmp(&other.changes);
        let distance = self.distance_km.total_cmp(&other.distance_km);

        match objective {
            Objective::Time => time.then(changes).then(distance),
            Objective::Distance => distance.then(time).then(changes),
            Objective::Changes => changes.then(time).then(distance),
        }
    }
}

/// A priority-queue entry, popped in the objective's node order.
#[derive(Debug, Clone)]
pub(crate) struct QueueEntry {
    pub objective: Objective,
    pub node: PathNode,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the best node
        other.node.cmp_for(&self.node, self.objective)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
