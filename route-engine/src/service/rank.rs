//! Route ranking for multi-route results.
//!
//! Different objectives often find the same way through the network, so
//! results are deduplicated by the stations they pass through before being
//! ranked.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::Route;

/// Jaccard similarity of two routes' intermediate stations.
///
/// Two routes with no intermediate stations are identical; one with and
/// one without share nothing.
pub fn route_similarity(a: &Route, b: &Route) -> f64 {
    let a: HashSet<&str> = a.intermediate_stations().iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.intermediate_stations().iter().map(String::as_str).collect();

    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let shared = a.intersection(&b).count();
            let all = a.union(&b).count();
            shared as f64 / all as f64
        }
    }
}

/// Whether two routes are near enough to count as one.
pub fn routes_similar(a: &Route, b: &Route, threshold: f64) -> bool {
    route_similarity(a, b) >= threshold
}

/// Keep the first of each group of similar routes, in input order.
pub fn deduplicate(routes: Vec<Route>, threshold: f64) -> Vec<Route> {
    let mut result: Vec<Route> = Vec::with_capacity(routes.len());
    for route in routes {
        if !result.iter().any(|kept| routes_similar(kept, &route, threshold)) {
            result.push(route);
        }
    }
    result
}

/// Rank routes by preference.
///
/// Routes are ranked by:
/// 1. Total journey time (shorter is better)
/// 2. Number of changes (fewer is better)
/// 3. Total distance (shorter is better)
pub fn rank_routes(mut routes: Vec<Route>) -> Vec<Route> {
    routes.sort_by(compare_routes);
    routes
}

fn compare_routes(a: &Route, b: &Route) -> Ordering {
    a.total_journey_time_minutes()
        .cmp(&b.total_journey_time_minutes())
        .then_with(|| a.changes_required().cmp(&b.changes_required()))
        .then_with(|| a.total_distance_km().total_cmp(&b.total_distance_km()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteSegment, ServicePattern};

    /// A route through `stations`, one segment per hop, each on its own line.
    fn route(stations: &[&str], mins: u32, km: f64) -> Route {
        let hops = stations.len() - 1;
        let segments = stations
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                RouteSegment::new(
                    pair[0],
                    pair[1],
                    format!("L{i}"),
                    km / hops as f64,
                    mins / hops as u32,
                    ServicePattern::NationalRail,
                )
            })
            .collect();
        Route::from_segments(segments, 0).unwrap()
    }

    #[test]
    fn similarity_of_intermediates() {
        let direct = route(&["A", "D"], 20, 20.0);
        let via_b = route(&["A", "B", "D"], 20, 20.0);
        let via_bc = route(&["A", "B", "C", "D"], 30, 20.0);
        let via_x = route(&["A", "X", "D"], 20, 20.0);

        assert_eq!(route_similarity(&direct, &direct), 1.0);
        assert_eq!(route_similarity(&direct, &via_b), 0.0);
        assert_eq!(route_similarity(&via_b, &via_bc), 0.5);
        assert_eq!(route_similarity(&via_b, &via_x), 0.0);
    }

    #[test]
    fn deduplicate_keeps_first_of_similar() {
        let first = route(&["A", "B", "C", "D"], 30, 20.0);
        let same_stations = route(&["A", "C", "B", "D"], 40, 25.0);
        let other = route(&["A", "X", "D"], 20, 20.0);

        let result = deduplicate(vec![first.clone(), same_stations, other.clone()], 0.8);
        assert_eq!(result, vec![first, other]);
    }

    #[test]
    fn rank_by_time_then_changes_then_distance() {
        let slow = route(&["A", "D"], 60, 10.0);
        let fast_two_changes = route(&["A", "B", "C", "D"], 30, 10.0);
        let fast_one_change = route(&["A", "X", "D"], 30, 50.0);
        let fast_one_change_short = route(&["A", "Y", "D"], 30, 40.0);

        let ranked = rank_routes(vec![
            slow.clone(),
            fast_two_changes.clone(),
            fast_one_change.clone(),
            fast_one_change_short.clone(),
        ]);
        assert_eq!(
            ranked,
            vec![fast_one_change_short, fast_one_change, fast_two_changes, slow]
        );
    }
}
