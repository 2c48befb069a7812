//! Builds routes that include underground macro segments.

use tracing::{debug, info, warn};

use crate::data::RailwayData;
use crate::domain::{Route, RouteSegment, ServicePattern};
use crate::graph::NetworkGraphBuilder;

use super::classifier::StationClassifier;
use super::estimator::JourneyEstimator;
use super::geography::{self, Region};
use super::systems::UndergroundSystem;
use super::terminals::TerminalManager;

/// Composes routes from estimated legs for one query.
///
/// Borrows everything it needs for the duration of a query: the
/// classifier, the network data, and the graph builder (for the length of
/// rail legs between stations on a common line).
pub struct RouteFactory<'a> {
    classifier: &'a StationClassifier,
    estimator: JourneyEstimator,
    data: &'a dyn RailwayData,
    spans: &'a NetworkGraphBuilder,
    interchange_penalty_mins: u32,
}

impl<'a> RouteFactory<'a> {
    pub fn new(
        classifier: &'a StationClassifier,
        data: &'a dyn RailwayData,
        spans: &'a NetworkGraphBuilder,
        interchange_penalty_mins: u32,
    ) -> Self {
        Self {
            classifier,
            estimator: JourneyEstimator::new(),
            data,
            spans,
            interchange_penalty_mins,
        }
    }

    /// One macro segment across an underground system.
    pub fn underground_segment(&self, from: &str, to: &str, system: UndergroundSystem) -> RouteSegment {
        RouteSegment::new(
            from,
            to,
            system.system_name(),
            self.estimator.underground_distance(from, to, system),
            self.estimator.underground_time(from, to, system),
            ServicePattern::Underground,
        )
        .with_service_id(system.service_id())
    }

    /// A national-rail leg that isn't searched.
    ///
    /// Ends on a common line take that line's length and running time;
    /// otherwise the terminal-to-terminal estimate applies.
    pub fn rail_segment(&self, from: &str, to: &str) -> RouteSegment {
        let line_name = self.estimator.line_between(from, to, self.data);
        let (km, mins) = self
            .data
            .get_railway_line_by_name(&line_name)
            .and_then(|line| self.spans.span(self.data, line, from, to))
            .unwrap_or_else(|| {
                (
                    self.estimator.national_rail_distance(from, to),
                    self.estimator.national_rail_time(from, to),
                )
            });

        RouteSegment::new(from, to, line_name, km, mins, ServicePattern::NationalRail)
    }

    /// A single-segment route within one system.
    pub fn black_box_route(&self, from: &str, to: &str, system: UndergroundSystem) -> Option<Route> {
        let route = Route::from_segments(vec![self.underground_segment(from, to, system)], 0).ok()?;
        info!(from = %from, to = %to, system = %system, "Created black-box route");
        Some(route)
    }

    /// Underground to a terminal, rail between terminals, underground on.
    ///
    /// Terminals come from each end's candidate list; the first pair where
    /// both are served by national rail is used. Legs that would start and
    /// end at the same station are left out.
    pub fn multi_system_route(
        &self,
        from: &str,
        to: &str,
        from_system: UndergroundSystem,
        to_system: UndergroundSystem,
    ) -> Option<Route> {
        let terminals = TerminalManager::new(self.classifier);
        let from_terminals = terminals.nearest_terminals(from, self.data);
        let to_terminals = terminals.nearest_terminals(to, self.data);

        let served = |t: &&String| self.data.validate_station_exists(t);
        let Some((from_terminal, to_terminal)) = from_terminals
            .iter()
            .filter(served)
            .find_map(|a| to_terminals.iter().find(served).map(|b| (a, b)))
        else {
            warn!(from = %from, to = %to, "No rail-served terminals for multi-system route");
            return None;
        };

        let mut segments = Vec::with_capacity(3);
        if from != from_terminal {
            segments.push(self.underground_segment(from, from_terminal, from_system));
        }
        if from_terminal != to_terminal {
            segments.push(self.rail_segment(from_terminal, to_terminal));
        }
        if to_terminal != to {
            segments.push(self.underground_segment(to_terminal, to, to_system));
        }

        let route = Route::from_segments(segments, self.interchange_penalty_mins).ok()?;
        info!(
            from = %from,
            via = %from_terminal,
            to_terminal = %to_terminal,
            to = %to,
            "Created multi-system route"
        );
        Some(route)
    }

    /// A Scotland ↔ South England journey as rail to a regional terminus,
    /// an underground hop across London, and rail on.
    ///
    /// Returns `None` unless the journey is cross-country and the
    /// composite has at least three legs.
    pub fn cross_country_route(&self, from: &str, to: &str) -> Option<Route> {
        if !geography::is_cross_country_route(from, to, self.data) {
            return None;
        }
        let (from_region, to_region) = geography::cross_country_regions(from, to, self.data)?;

        let south = Region::SouthEngland.terminals();
        let from_terminus = geography::find_best_terminus(from, from_region.terminals(), self.data);
        let to_terminus = geography::find_best_terminus(to, to_region.terminals(), self.data);

        // The London terminal facing the Scottish end
        let (london_from, london_to) = if from_region == Region::SouthEngland {
            let gateway = geography::find_best_terminus(&to_terminus, south, self.data);
            geography::best_london_connection(&from_terminus, &gateway)
        } else {
            let gateway = geography::find_best_terminus(&from_terminus, south, self.data);
            geography::best_london_connection(&gateway, &to_terminus)
        };

        let waypoints: [&str; 6] = [from, &from_terminus, &london_from, &london_to, &to_terminus, to];
        let mut segments = Vec::with_capacity(5);
        for (leg, pair) in waypoints.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            let segment = match leg {
                0 => self.access_segment(a, b, a),
                2 => self.underground_segment(a, b, UndergroundSystem::London),
                4 => self.access_segment(a, b, b),
                _ => self.rail_segment(a, b),
            };
            segments.push(segment);
        }

        if segments.len() < 3 {
            debug!(from = %from, to = %to, legs = segments.len(), "Cross-country composite too short");
            return None;
        }

        let route = Route::from_segments(segments, 0).ok()?;
        info!(
            from = %from,
            to = %to,
            via = %format!("{london_from} → {london_to}"),
            "Created cross-country route"
        );
        Some(route)
    }

    /// A leg between a station and its terminus: underground if the station
    /// is only on an underground system, otherwise rail.
    fn access_segment(&self, a: &str, b: &str, station: &str) -> RouteSegment {
        match self.classifier.underground_system(station) {
            Some(system) if self.classifier.is_underground_only(station, self.data) => {
                self.underground_segment(a, b, system)
            }
            _ => self.rail_segment(a, b),
        }
    }

    /// Re-describe legs touching underground-only stations as macro
    /// segments, and hide underground-only calling points.
    ///
    /// Adjacent legs on the same system become one segment. Totals and
    /// endpoints are unchanged.
    pub fn enhance_route_with_black_box(&self, route: Route) -> Route {
        let segments = merge_underground_runs(
            route
                .segments()
                .iter()
                .map(|segment| self.retag_segment(segment)),
        );

        let path = route.full_path();
        let full_path = match path {
            [first, middle @ .., last] => {
                let mut kept = vec![first.clone()];
                kept.extend(TerminalManager::new(self.classifier).filter_underground_stations_from_path(middle, self.data));
                kept.push(last.clone());
                kept
            }
            _ => path.to_vec(),
        };

        match route.clone().with_segments(segments, full_path) {
            Ok(enhanced) => enhanced,
            Err(err) => {
                warn!(error = %err, "Could not enhance route; keeping original");
                route
            }
        }
    }

    fn retag_segment(&self, segment: &RouteSegment) -> RouteSegment {
        let touches_underground_only = self.classifier.is_underground_only(&segment.from_station, self.data)
            || self.classifier.is_underground_only(&segment.to_station, self.data);
        if !touches_underground_only {
            return segment.clone();
        }

        let system = self
            .classifier
            .underground_system(&segment.to_station)
            .or_else(|| self.classifier.underground_system(&segment.from_station));
        match system {
            Some(system) => {
                debug!(
                    from = %segment.from_station,
                    to = %segment.to_station,
                    system = %system,
                    "Collapsed segment into black box"
                );
                RouteSegment {
                    line_name: system.system_name().to_string(),
                    service_pattern: ServicePattern::Underground,
                    service_id: system.service_id(),
                    ..segment.clone()
                }
            }
            None => segment.clone(),
        }
    }
}

/// Join consecutive underground segments of one system end to end.
fn merge_underground_runs(segments: impl IntoIterator<Item = RouteSegment>) -> Vec<RouteSegment> {
    let mut merged: Vec<RouteSegment> = Vec::new();
    for segment in segments {
        if let Some(last) = merged.last_mut()
            && last.service_pattern == ServicePattern::Underground
            && segment.service_pattern == ServicePattern::Underground
            && last.line_name == segment.line_name
        {
            last.to_station = segment.to_station;
            last.distance_km += segment.distance_km;
            last.journey_time_minutes += segment.journey_time_minutes;
            continue;
        }
        merged.push(segment);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StationLineRepository;
    use crate::domain::{Coordinates, RailwayLine, Station};
    use crate::planner::EngineConfig;
    use crate::underground::UndergroundNetworks;

    fn classifier() -> StationClassifier {
        StationClassifier::new(
            UndergroundNetworks::new()
                .with_system(
                    UndergroundSystem::London,
                    &["Oxford Circus", "Bank", "Waterloo", "Euston", "Kings Cross St Pancras"],
                    &[],
                )
                .with_system(
                    UndergroundSystem::Glasgow,
                    &["St Enoch", "Buchanan Street", "Hillhead", "Partick"],
                    &["St Enoch", "Buchanan Street"],
                ),
        )
    }

    fn repo() -> StationLineRepository {
        let swml = RailwayLine::new(
            "South Western Main Line",
            ["London Waterloo", "Woking", "Basingstoke", "Southampton Central"],
        )
        .unwrap()
        .with_journey_time("London Waterloo", "Woking", 25)
        .with_journey_time("Woking", "Basingstoke", 20)
        .with_journey_time("Basingstoke", "Southampton Central", 25);
        let wcml = RailwayLine::new("West Coast Main Line", ["London Euston", "Preston", "Glasgow Central"])
            .unwrap()
            .with_journey_time("London Euston", "Preston", 130)
            .with_journey_time("Preston", "Glasgow Central", 150);
        StationLineRepository::from_lines(vec![swml, wcml])
            .with_station_details(Station::new("Glasgow Central").with_coordinates(Coordinates::new(55.86, -4.26)))
            .with_station_details(Station::new("Southampton Central").with_coordinates(Coordinates::new(50.91, -1.41)))
    }

    fn assert_contiguous(route: &Route) {
        for pair in route.segments().windows(2) {
            assert_eq!(pair[0].to_station, pair[1].from_station);
        }
        assert_eq!(route.segments()[0].from_station, route.from_station());
        assert_eq!(route.segments().last().unwrap().to_station, route.to_station());
    }

    #[test]
    fn black_box_is_one_segment() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let route = factory
            .black_box_route("Oxford Circus", "Bank", UndergroundSystem::London)
            .unwrap();
        assert_eq!(route.segments().len(), 1);
        assert_eq!(route.changes_required(), 0);
        assert_eq!(route.segments()[0].service_pattern, ServicePattern::Underground);
        assert_eq!(route.segments()[0].service_id, "LONDON_UNDERGROUND_SERVICE");
        assert_eq!(route.segments()[0].line_name, "London Underground");
        assert_eq!(route.total_journey_time_minutes(), 10);

        let glasgow = factory
            .black_box_route("Hillhead", "St Enoch", UndergroundSystem::Glasgow)
            .unwrap();
        assert_eq!(glasgow.segments()[0].service_id, "GLASGOW_UNDERGROUND_SERVICE");
    }

    #[test]
    fn rail_segment_uses_line_span_when_available() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let on_line = factory.rail_segment("Southampton Central", "London Waterloo");
        assert_eq!(on_line.line_name, "South Western Main Line");
        assert_eq!(on_line.journey_time_minutes, 70);

        let estimated = factory.rail_segment("London Waterloo", "Glasgow Central");
        assert_eq!(estimated.line_name, "West Coast Main Line");
        assert_eq!(estimated.distance_km, 650.0);
        assert_eq!(estimated.service_id, "WEST_COAST_MAIN_LINE_SERVICE");
    }

    #[test]
    fn multi_system_route_joins_via_terminals() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let route = factory
            .multi_system_route("Hillhead", "Oxford Circus", UndergroundSystem::Glasgow, UndergroundSystem::London)
            .unwrap();
        assert_contiguous(&route);

        let stations: Vec<_> = route.full_path().iter().map(String::as_str).collect();
        assert_eq!(stations, ["Hillhead", "Glasgow Central", "London Waterloo", "Oxford Circus"]);
        assert_eq!(route.changes_required(), 2);

        let segment_time: u32 = route.segments().iter().map(|s| s.journey_time_minutes).sum();
        assert_eq!(route.total_journey_time_minutes(), segment_time + 10);
    }

    #[test]
    fn multi_system_without_rail_terminals() {
        let c = classifier();
        let repo = StationLineRepository::from_lines(vec![RailwayLine::new("Branch", ["X", "Y"]).unwrap()]);
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        assert!(factory
            .multi_system_route("Hillhead", "Bank", UndergroundSystem::Glasgow, UndergroundSystem::London)
            .is_none());
    }

    #[test]
    fn cross_country_south_to_scotland() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let route = factory.cross_country_route("Southampton Central", "Hillhead").unwrap();
        assert_contiguous(&route);
        assert!(route.segments().len() >= 3);

        let stations: Vec<_> = route.full_path().iter().map(String::as_str).collect();
        assert_eq!(
            stations,
            ["Southampton Central", "London Waterloo", "London Euston", "Glasgow Central", "Hillhead"]
        );
        let patterns: Vec<_> = route.segments().iter().map(|s| s.service_pattern).collect();
        assert_eq!(
            patterns,
            [
                ServicePattern::NationalRail,
                ServicePattern::Underground,
                ServicePattern::NationalRail,
                ServicePattern::Underground
            ]
        );
        assert_eq!(route.changes_required(), 3);

        // No interchange minutes on cross-country composites
        let segment_time: u32 = route.segments().iter().map(|s| s.journey_time_minutes).sum();
        assert_eq!(route.total_journey_time_minutes(), segment_time);
    }

    #[test]
    fn cross_country_scotland_to_south() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let route = factory.cross_country_route("Glasgow Central", "Southampton Central").unwrap();
        assert_contiguous(&route);
        let stations: Vec<_> = route.full_path().iter().map(String::as_str).collect();
        assert_eq!(
            stations,
            ["Glasgow Central", "London Euston", "London Waterloo", "Southampton Central"]
        );
        assert_eq!(route.segments()[1].line_name, "London Underground");
    }

    #[test]
    fn not_cross_country() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        assert!(factory.cross_country_route("Woking", "Basingstoke").is_none());
    }

    #[test]
    fn enhance_collapses_underground_only_legs() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let segments = vec![
            RouteSegment::new("Woking", "London Waterloo", "South Western Main Line", 40.0, 25, ServicePattern::NationalRail),
            RouteSegment::new("London Waterloo", "Bank", "WALKING", 2.0, 20, ServicePattern::Walking),
            RouteSegment::new("Bank", "Oxford Circus", "WALKING", 2.0, 20, ServicePattern::Walking),
        ];
        let route = Route::from_segments(segments, 5).unwrap();
        let enhanced = factory.enhance_route_with_black_box(route.clone());

        assert_eq!(enhanced.total_journey_time_minutes(), route.total_journey_time_minutes());
        assert_eq!(enhanced.segments()[0], route.segments()[0]);
        assert_eq!(enhanced.segments().len(), 2);
        let tube = &enhanced.segments()[1];
        assert_eq!(tube.service_pattern, ServicePattern::Underground);
        assert_eq!(tube.line_name, "London Underground");
        assert_eq!((tube.from_station.as_str(), tube.to_station.as_str()), ("London Waterloo", "Oxford Circus"));
        assert_eq!(tube.journey_time_minutes, 40);
        assert_eq!(enhanced.changes_required(), 1);
        // Bank is underground-only and not an endpoint
        assert_eq!(enhanced.full_path(), ["Woking", "London Waterloo", "Oxford Circus"]);
    }

    #[test]
    fn adjacent_underground_legs_merge() {
        let (c, repo) = (classifier(), repo());
        let builder = NetworkGraphBuilder::new(&EngineConfig::default());
        let factory = RouteFactory::new(&c, &repo, &builder, 5);

        let tube = |from: &str, to: &str| {
            RouteSegment::new(from, to, "London Underground", 3.0, 8, ServicePattern::Underground)
        };
        let segments = vec![
            tube("Euston", "Kings Cross St Pancras"),
            tube("Kings Cross St Pancras", "Bank"),
            tube("Bank", "Waterloo"),
        ];
        let route = Route::from_segments(segments, 5).unwrap();
        let enhanced = factory.enhance_route_with_black_box(route);

        assert_eq!(enhanced.segments().len(), 1);
        assert_eq!(enhanced.segments()[0].distance_km, 9.0);
        assert_eq!(enhanced.segments()[0].journey_time_minutes, 24);
        assert_eq!(enhanced.changes_required(), 0);
        assert_eq!(enhanced.total_journey_time_minutes(), 24);
        assert_eq!(enhanced.full_path(), ["Euston", "Waterloo"]);
    }
}
