//! Turning search results into routes.

use crate::domain::{DomainError, Route, RouteSegment, ServicePattern};
use crate::graph::Connection;
use crate::planner::PathNode;
use crate::underground::UndergroundSystem;

/// Error converting a search path into a route.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The path never left its origin
    #[error("path has no connections")]
    EmptyPath,

    /// Stations and connections don't line up
    #[error("path has {stations} stations but {hops} connections")]
    LengthMismatch { stations: usize, hops: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Builds [`Route`]s from paths and from known line spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteConverter;

impl RouteConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a found path into a route.
    ///
    /// One segment per run of hops on the same line. Totals are the node's
    /// own, so interchange time is carried over rather than recomputed.
    pub fn path_to_route(&self, node: &PathNode) -> Result<Route, ConversionError> {
        if node.hops.is_empty() {
            return Err(ConversionError::EmptyPath);
        }
        if node.path.len() != node.hops.len() + 1 {
            return Err(ConversionError::LengthMismatch {
                stations: node.path.len(),
                hops: node.hops.len(),
            });
        }

        let segments = group_hops(&node.hops);
        let route = Route::new(
            &node.path[0],
            &node.station,
            segments,
            node.distance_km,
            node.time_minutes,
            node.path.clone(),
        )?;
        Ok(route)
    }

    /// A single-segment route along one line.
    pub fn create_direct_route(
        &self,
        from: &str,
        to: &str,
        line: &str,
        journey_time_minutes: u32,
        distance_km: f64,
    ) -> Result<Route, ConversionError> {
        let segment = RouteSegment::new(
            from,
            to,
            line,
            distance_km,
            journey_time_minutes,
            pattern_for_line(line),
        );
        Ok(Route::from_segments(vec![segment], 0)?)
    }

    /// Two routes joined at an interchange.
    pub fn create_interchange_route(
        &self,
        first: &Route,
        second: &Route,
        interchange_penalty_mins: u32,
    ) -> Result<Route, ConversionError> {
        let segments: Vec<RouteSegment> = first.segments().iter().chain(second.segments()).cloned().collect();
        let mut full_path = first.full_path().to_vec();
        full_path.extend(second.full_path().iter().skip(1).cloned());

        let route = Route::new(
            first.from_station(),
            second.to_station(),
            segments,
            first.total_distance_km() + second.total_distance_km(),
            first.total_journey_time_minutes() + second.total_journey_time_minutes() + interchange_penalty_mins,
            full_path,
        )?;
        Ok(route)
    }
}

/// Merge consecutive hops on the same line into segments.
fn group_hops(hops: &[Connection]) -> Vec<RouteSegment> {
    let mut segments: Vec<RouteSegment> = Vec::new();

    for hop in hops {
        if let Some(last) = segments.last_mut()
            && last.line_name == hop.line
            && !hop.is_walking
        {
            last.to_station = hop.to_station.clone();
            last.distance_km += hop.distance_km;
            last.journey_time_minutes += hop.time_minutes;
            continue;
        }

        let pattern = if hop.is_walking {
            ServicePattern::Walking
        } else {
            pattern_for_line(&hop.line)
        };
        let segment = RouteSegment::new(
            &hop.from_station,
            &hop.to_station,
            &hop.line,
            hop.distance_km,
            hop.time_minutes,
            pattern,
        )
        .with_direct(hop.is_direct);
        segments.push(tag_underground(segment));
    }

    segments
}

fn pattern_for_line(line: &str) -> ServicePattern {
    if UndergroundSystem::from_system_name(line).is_some() {
        ServicePattern::Underground
    } else {
        ServicePattern::NationalRail
    }
}

/// Underground segments carry their system's service id.
fn tag_underground(segment: RouteSegment) -> RouteSegment {
    match UndergroundSystem::from_system_name(&segment.line_name) {
        Some(system) if segment.service_pattern == ServicePattern::Underground => {
            segment.with_service_id(system.service_id())
        }
        _ => segment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(hops: &[Connection], penalty: u32) -> PathNode {
        hops.iter()
            .fold(PathNode::origin(&hops[0].from_station), |node, hop| node.extend(hop, penalty))
    }

    #[test]
    fn one_segment_per_line() {
        let hops = [
            Connection::rail("A", "B", "L1", 10, 8.0),
            Connection::rail("B", "C", "L1", 10, 8.0),
            Connection::rail("C", "D", "L2", 5, 4.0),
        ];
        let route = RouteConverter::new().path_to_route(&node(&hops, 5)).unwrap();

        assert_eq!(route.segments().len(), 2);
        assert_eq!(route.segments()[0].from_station, "A");
        assert_eq!(route.segments()[0].to_station, "C");
        assert_eq!(route.segments()[0].journey_time_minutes, 20);
        assert_eq!(route.segments()[0].distance_km, 16.0);
        assert_eq!(route.segments()[1].service_id, "L2_SERVICE");
        assert_eq!(route.changes_required(), 1);
        assert_eq!(route.total_journey_time_minutes(), 30);
        assert_eq!(route.full_path(), ["A", "B", "C", "D"]);
    }

    #[test]
    fn through_service_is_not_a_change() {
        let hops = [
            Connection::rail("A", "B", "L1", 10, 8.0),
            Connection::rail("B", "C", "L2", 10, 8.0).direct(),
        ];
        let route = RouteConverter::new().path_to_route(&node(&hops, 5)).unwrap();

        assert_eq!(route.segments().len(), 2);
        assert!(route.segments()[1].is_direct);
        assert_eq!(route.changes_required(), 0);
        assert_eq!(route.total_journey_time_minutes(), 20);
    }

    #[test]
    fn walking_and_underground_patterns() {
        let hops = [
            Connection::walk("A", "B", 5, 0.3),
            Connection::walk("B", "C", 5, 0.3),
            Connection::rail("C", "D", "London Underground", 10, 5.0),
        ];
        let route = RouteConverter::new().path_to_route(&node(&hops, 5)).unwrap();

        // Walks are never merged
        assert_eq!(route.segments().len(), 3);
        assert_eq!(route.segments()[0].service_pattern, ServicePattern::Walking);
        assert_eq!(route.segments()[0].service_id, "WALKING_A_B");
        assert_eq!(route.segments()[2].service_pattern, ServicePattern::Underground);
        assert_eq!(route.segments()[2].service_id, "LONDON_UNDERGROUND_SERVICE");
    }

    #[test]
    fn empty_and_inconsistent_paths() {
        let converter = RouteConverter::new();
        assert_eq!(
            converter.path_to_route(&PathNode::origin("A")),
            Err(ConversionError::EmptyPath)
        );

        let mut broken = node(&[Connection::rail("A", "B", "L1", 10, 8.0)], 5);
        broken.path.push("C".to_string());
        assert_eq!(
            converter.path_to_route(&broken),
            Err(ConversionError::LengthMismatch { stations: 3, hops: 1 })
        );
    }

    #[test]
    fn direct_and_interchange_routes() {
        let converter = RouteConverter::new();
        let first = converter.create_direct_route("A", "B", "L1", 10, 8.0).unwrap();
        let second = converter.create_direct_route("B", "C", "L2", 15, 12.0).unwrap();
        assert_eq!(first.changes_required(), 0);

        let joined = converter.create_interchange_route(&first, &second, 5).unwrap();
        assert_eq!(joined.full_path(), ["A", "B", "C"]);
        assert_eq!(joined.changes_required(), 1);
        assert_eq!(joined.total_journey_time_minutes(), 30);
        assert_eq!(joined.total_distance_km(), 20.0);

        assert!(matches!(
            converter.create_interchange_route(&second, &first, 5),
            Err(ConversionError::Domain(DomainError::EndpointMismatch { .. }))
                | Err(ConversionError::Domain(DomainError::NotContiguous { .. }))
        ));
    }
}
