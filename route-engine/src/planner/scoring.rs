//! How the search chooses and weighs connections.
//!
//! For each neighbour the search narrows the candidate connections
//! (common lines, a regional preference, through services, walks), picks
//! one with a tiered comparator, and weighs the resulting node for the
//! priority queue.

use tracing::{debug, warn};

use crate::data::RailwayData;
use crate::domain::is_london_name;
use crate::graph::Connection;
use crate::termini::{
    EXTENDED_LONDON_TERMINALS, StationPairs, directly_connected_termini, is_major_london_terminal, walking_bridges,
};
use crate::underground::is_known_cross_country_pair;

use super::config::{Objective, RoutePreferences};
use super::node::PathNode;

/// Line whose connections get the underground bonus.
const UNDERGROUND_LINE: &str = "London Underground";

/// The regional preference: journeys out of these start on the South
/// Western Main Line towards Waterloo.
const REGIONAL_LINE: &str = "South Western Main Line";

/// Accumulated distance after which a journey not touching London may pass
/// through non-terminal London stations.
const CROSS_LONDON_ADMIT_KM: f64 = 30.0;

/// Accumulated distance after which an underground hop counts as crossing
/// London for the bonus.
const CROSS_LONDON_BONUS_KM: f64 = 20.0;

/// Weight multiplier for a walk taken despite `avoid_walking`.
const WALKING_WEIGHT_FACTOR: f64 = 2.0;

/// Extra weight per change when through services are preferred.
const PREFER_DIRECT_PENALTY: f64 = 10.0;

/// Why a connection is preferred, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionTier {
    /// South Western Main Line towards Waterloo from the Farnborough area
    RegionalPriority,
    /// A short walk between two adjacent stations on different lines
    WalkingBridge,
    /// A line serving both ends of the journey
    CommonLine,
    /// Staying on the line of the previous hop
    ContinueLine,
    /// A through service
    Direct,
    Base,
}

/// Everything about one query that scoring needs.
pub struct SearchContext<'a> {
    start: &'a str,
    end: &'a str,
    objective: Objective,
    preferences: RoutePreferences,
    data: &'a dyn RailwayData,
    common_lines: Vec<String>,
    journey_touches_london: bool,
    cross_country: bool,
    termini_pairs: StationPairs,
    bridges: StationPairs,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        start: &'a str,
        end: &'a str,
        data: &'a dyn RailwayData,
        objective: Objective,
        preferences: Option<&RoutePreferences>,
    ) -> Self {
        let common_lines = data.get_common_lines(start, end);
        if !common_lines.is_empty() {
            debug!(start = %start, end = %end, lines = ?common_lines, "Restricting search to common lines");
        }

        Self {
            start,
            end,
            objective,
            preferences: preferences.cloned().unwrap_or_default(),
            data,
            common_lines,
            journey_touches_london: is_london_name(start) || is_london_name(end),
            cross_country: is_known_cross_country_pair(start, end),
            termini_pairs: directly_connected_termini(),
            bridges: walking_bridges(),
        }
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn common_lines(&self) -> &[String] {
        &self.common_lines
    }

    /// Neither end in London, and either far enough along or a known
    /// cross-country pair.
    fn is_cross_london(&self, travelled_km: f64, threshold_km: f64) -> bool {
        !self.journey_touches_london && (travelled_km > threshold_km || self.cross_country)
    }

    /// Whether the search may step from `current` onto `next`.
    pub fn admits(&self, current: &PathNode, next: &str) -> bool {
        if next == self.end || !is_london_name(next) {
            return true;
        }
        if self.preferences.avoid_london && next != self.start {
            debug!(station = %next, "Avoiding London station");
            return false;
        }
        if is_major_london_terminal(next) || self.is_cross_london(current.distance_km, CROSS_LONDON_ADMIT_KM) {
            return true;
        }
        debug!(station = %next, "Skipping non-terminal London station");
        false
    }

    /// Narrow the connections to one neighbour to those worth scoring.
    ///
    /// Returns `None` if the neighbour should be skipped altogether.
    pub fn candidates<'c>(&self, current: &PathNode, connections: &'c [Connection]) -> Option<Vec<&'c Connection>> {
        let mut candidates: Vec<&Connection> = connections.iter().collect();

        if !self.common_lines.is_empty() {
            candidates.retain(|c| self.common_lines.contains(&c.line));
            if candidates.is_empty() {
                return None;
            }
        }

        let regional: Vec<&Connection> = if self.regional_priority_applies() {
            candidates
                .iter()
                .copied()
                .filter(|c| self.is_regional_connection(c))
                .collect()
        } else {
            Vec::new()
        };
        let direct: Vec<&Connection> = candidates.iter().copied().filter(|c| c.is_direct).collect();

        if !regional.is_empty() {
            candidates = regional;
        } else if !direct.is_empty() {
            candidates = direct;
        }

        if self.preferences.avoid_walking {
            let (walking, riding): (Vec<&Connection>, Vec<&Connection>) =
                candidates.iter().copied().partition(|c| self.is_walking_connection(c));
            if !riding.is_empty() {
                candidates = riding;
            } else if !walking.is_empty() {
                warn!(
                    from = %current.station,
                    to = %walking[0].to_station,
                    "No alternative to walking; network may be disconnected otherwise"
                );
            }
        }

        (!candidates.is_empty()).then_some(candidates)
    }

    fn regional_priority_applies(&self) -> bool {
        self.start.contains("Farnborough") || self.start == "Clapham Junction"
    }

    fn is_regional_connection(&self, connection: &Connection) -> bool {
        connection.line == REGIONAL_LINE && connection.to_station.contains("Waterloo")
    }

    /// Whether a connection is a walk between stations rather than a ride.
    pub fn is_walking_connection(&self, connection: &Connection) -> bool {
        if connection.is_walking || connection.line.to_lowercase().contains("walking") {
            return true;
        }

        let (from, to) = (connection.from_station.as_str(), connection.to_station.as_str());
        if !self.data.get_common_lines(from, to).is_empty() {
            return false;
        }

        let terminal = |s: &str| EXTENDED_LONDON_TERMINALS.contains(&s);
        let non_terminal_london = |s: &str| is_london_name(s) && !terminal(s);
        if !self.termini_pairs.contains(from, to)
            && (non_terminal_london(from) || non_terminal_london(to) || (terminal(from) && terminal(to)))
        {
            return true;
        }

        connection.distance_km > self.preferences.max_walking_distance_km
    }

    /// How strongly a connection is preferred.
    pub fn tier(&self, current: &PathNode, connection: &Connection) -> ConnectionTier {
        if self.start.contains("Farnborough") && self.is_regional_connection(connection) {
            ConnectionTier::RegionalPriority
        } else if self.bridges.contains(&current.station, &connection.to_station) {
            ConnectionTier::WalkingBridge
        } else if self.common_lines.contains(&connection.line) {
            ConnectionTier::CommonLine
        } else if current.last_line() == Some(connection.line.as_str()) {
            ConnectionTier::ContinueLine
        } else if connection.is_direct {
            ConnectionTier::Direct
        } else {
            ConnectionTier::Base
        }
    }

    /// The connection to take to a neighbour.
    ///
    /// Time and distance searches rank by tier, then by the connection's own
    /// time or distance. The changes search groups common-line, same-line
    /// and through connections ahead of everything else.
    pub fn select_best_connection<'c>(&self, current: &PathNode, candidates: &[&'c Connection]) -> Option<&'c Connection> {
        let base = |c: &Connection| match self.objective {
            Objective::Distance => c.distance_km,
            Objective::Time | Objective::Changes => f64::from(c.time_minutes),
        };

        match self.objective {
            Objective::Changes => candidates.iter().copied().min_by(|a, b| {
                let key = |c: &Connection| match self.tier(current, c) {
                    ConnectionTier::CommonLine => (0, 0),
                    ConnectionTier::ContinueLine => (0, 1),
                    ConnectionTier::Direct => (0, 2),
                    _ => (1, 0),
                };
                key(a).cmp(&key(b)).then(base(a).total_cmp(&base(b)))
            }),
            Objective::Time | Objective::Distance => candidates.iter().copied().min_by(|a, b| {
                self.tier(current, a)
                    .cmp(&self.tier(current, b))
                    .then(base(a).total_cmp(&base(b)))
            }),
        }
    }

    /// Discount for underground hops that help a journey across London.
    pub fn underground_bonus(&self, current: &PathNode, connection: &Connection) -> f64 {
        if connection.line != UNDERGROUND_LINE {
            return 1.0;
        }

        let cross_london = self.is_cross_london(current.distance_km, CROSS_LONDON_BONUS_KM);
        let factor = if is_major_london_terminal(&connection.to_station) {
            match (cross_london, self.cross_country) {
                (true, true) => 0.2,
                (true, false) => 0.3,
                _ if current.distance_km > 15.0 => 0.6,
                _ => 0.8,
            }
        } else if cross_london {
            0.7
        } else {
            1.0
        };

        if factor < 1.0 {
            debug!(
                from = %current.station,
                to = %connection.to_station,
                factor,
                "Applied underground bonus"
            );
        }
        factor
    }

    /// Queue weight of `next`, reached from `current` by `connection`.
    pub fn calculate_weight(&self, current: &PathNode, next: &PathNode, connection: &Connection) -> f64 {
        let mut weight = match self.objective {
            Objective::Time => f64::from(next.time_minutes),
            Objective::Distance => next.distance_km,
            Objective::Changes => {
                let through = if connection.is_direct { 0 } else { 1000 };
                f64::from(next.changes * 1000 + through + next.time_minutes)
            }
        };

        weight *= self.underground_bonus(current, connection);

        // Only reached when walking is the sole way on
        if self.preferences.avoid_walking && self.is_walking_connection(connection) {
            weight *= WALKING_WEIGHT_FACTOR;
        }
        if self.preferences.prefer_direct {
            weight += PREFER_DIRECT_PENALTY * f64::from(next.changes);
        }
        weight
    }
}
