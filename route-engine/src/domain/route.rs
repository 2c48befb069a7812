//! Routes and route segments.
//!
//! A [`Route`] is the answer to "how do I get from A to B": an ordered,
//! contiguous list of [`RouteSegment`]s plus totals. Routes are immutable
//! values; the constructor checks that the segments join up and derives
//! the change count from the segment boundaries.

use std::fmt;

use serde::Serialize;

use super::DomainError;

/// How a segment is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServicePattern {
    NationalRail,
    Underground,
    Walking,
}

impl fmt::Display for ServicePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServicePattern::NationalRail => "NATIONAL_RAIL",
            ServicePattern::Underground => "UNDERGROUND",
            ServicePattern::Walking => "WALKING",
        };
        f.write_str(label)
    }
}

/// One leg of a route travelled on a single line (or on foot).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub from_station: String,
    pub to_station: String,
    pub line_name: String,
    pub distance_km: f64,
    pub journey_time_minutes: u32,
    pub service_pattern: ServicePattern,

    /// Synthetic identifier for the service travelled
    pub service_id: String,

    /// True if this segment is reached on a through service, so boarding
    /// it does not count as a change.
    pub is_direct: bool,
}

impl RouteSegment {
    /// Create a segment with a service id derived from its line and pattern.
    pub fn new(
        from_station: impl Into<String>,
        to_station: impl Into<String>,
        line_name: impl Into<String>,
        distance_km: f64,
        journey_time_minutes: u32,
        service_pattern: ServicePattern,
    ) -> Self {
        let from_station = from_station.into();
        let to_station = to_station.into();
        let line_name = line_name.into();
        let service_id = service_id(&line_name, service_pattern, &from_station, &to_station);

        Self {
            from_station,
            to_station,
            line_name,
            distance_km,
            journey_time_minutes,
            service_pattern,
            service_id,
            is_direct: false,
        }
    }

    /// Override the generated service id.
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = service_id.into();
        self
    }

    /// Mark whether the segment continues a through service.
    pub fn with_direct(mut self, is_direct: bool) -> Self {
        self.is_direct = is_direct;
        self
    }

    /// Returns true if this segment is a macro hop over an underground system.
    pub fn is_underground(&self) -> bool {
        self.service_pattern == ServicePattern::Underground
    }
}

/// Synthetic service id for a segment.
///
/// Walking legs are keyed by their endpoints; everything else by line.
pub fn service_id(line: &str, pattern: ServicePattern, from: &str, to: &str) -> String {
    match pattern {
        ServicePattern::Walking => {
            format!("WALKING_{}_{}", upper_snake(from), upper_snake(to))
        }
        ServicePattern::Underground | ServicePattern::NationalRail => {
            format!("{}_SERVICE", upper_snake(line))
        }
    }
}

/// "South Western Main Line" -> "SOUTH_WESTERN_MAIN_LINE"
pub(crate) fn upper_snake(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Count the change boundaries in a segment list.
///
/// A boundary is a change when the line changes there and the next segment
/// is not a through service.
pub fn count_changes(segments: &[RouteSegment]) -> u32 {
    segments
        .windows(2)
        .filter(|pair| pair[0].line_name != pair[1].line_name && !pair[1].is_direct)
        .count() as u32
}

/// A complete route between two stations.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    from_station: String,
    to_station: String,
    segments: Vec<RouteSegment>,
    total_distance_km: f64,
    total_journey_time_minutes: u32,
    changes_required: u32,
    full_path: Vec<String>,
}

impl Route {
    /// Create a route, validating that segments are contiguous and span
    /// `from_station` to `to_station`.
    ///
    /// Totals are taken as given (they may include interchange time that
    /// no single segment carries). The change count is derived from the
    /// segment boundaries.
    pub fn new(
        from_station: impl Into<String>,
        to_station: impl Into<String>,
        segments: Vec<RouteSegment>,
        total_distance_km: f64,
        total_journey_time_minutes: u32,
        full_path: Vec<String>,
    ) -> Result<Self, DomainError> {
        let from_station = from_station.into();
        let to_station = to_station.into();

        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DomainError::EmptyRoute),
        };

        if first.from_station != from_station {
            return Err(DomainError::EndpointMismatch {
                expected: from_station,
                found: first.from_station.clone(),
            });
        }
        if last.to_station != to_station {
            return Err(DomainError::EndpointMismatch {
                expected: to_station,
                found: last.to_station.clone(),
            });
        }

        for (index, pair) in segments.windows(2).enumerate() {
            if pair[0].to_station != pair[1].from_station {
                return Err(DomainError::NotContiguous {
                    index,
                    ends_at: pair[0].to_station.clone(),
                    starts_at: pair[1].from_station.clone(),
                });
            }
        }

        let changes_required = count_changes(&segments);
        Ok(Self {
            from_station,
            to_station,
            segments,
            total_distance_km,
            total_journey_time_minutes,
            changes_required,
            full_path,
        })
    }

    /// Build a route from segments alone, summing their totals and adding
    /// `interchange_minutes` per change.
    pub fn from_segments(
        segments: Vec<RouteSegment>,
        interchange_minutes: u32,
    ) -> Result<Self, DomainError> {
        let (from, to) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first.from_station.clone(), last.to_station.clone()),
            _ => return Err(DomainError::EmptyRoute),
        };

        let distance: f64 = segments.iter().map(|s| s.distance_km).sum();
        let time: u32 = segments.iter().map(|s| s.journey_time_minutes).sum::<u32>()
            + count_changes(&segments) * interchange_minutes;

        let mut full_path = vec![from.clone()];
        full_path.extend(segments.iter().map(|s| s.to_station.clone()));

        Self::new(from, to, segments, distance, time, full_path)
    }

    pub fn from_station(&self) -> &str {
        &self.from_station
    }

    pub fn to_station(&self) -> &str {
        &self.to_station
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn total_journey_time_minutes(&self) -> u32 {
        self.total_journey_time_minutes
    }

    pub fn changes_required(&self) -> u32 {
        self.changes_required
    }

    /// Every station passed through, origin and destination included.
    pub fn full_path(&self) -> &[String] {
        &self.full_path
    }

    /// Stations strictly between origin and destination.
    pub fn intermediate_stations(&self) -> &[String] {
        if self.full_path.len() <= 2 {
            &[]
        } else {
            &self.full_path[1..self.full_path.len() - 1]
        }
    }

    /// Distinct line names in travel order.
    pub fn lines_used(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if !lines.contains(&segment.line_name.as_str()) {
                lines.push(&segment.line_name);
            }
        }
        lines
    }

    /// Returns true if the route needs no change of train.
    pub fn is_direct(&self) -> bool {
        self.changes_required == 0
    }

    /// Replace segments and path, keeping the totals.
    ///
    /// Used when re-describing legs of an existing route (e.g. collapsing
    /// underground legs) without changing where it goes.
    pub fn with_segments(
        self,
        segments: Vec<RouteSegment>,
        full_path: Vec<String>,
    ) -> Result<Self, DomainError> {
        Self::new(
            self.from_station,
            self.to_station,
            segments,
            self.total_distance_km,
            self.total_journey_time_minutes,
            full_path,
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {} ({} min, {:.1} km, {} changes)",
            self.from_station,
            self.to_station,
            self.total_journey_time_minutes,
            self.total_distance_km,
            self.changes_required
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rail(from: &str, to: &str, line: &str, mins: u32) -> RouteSegment {
        RouteSegment::new(from, to, line, 10.0, mins, ServicePattern::NationalRail)
    }

    #[test]
    fn service_ids() {
        assert_eq!(
            service_id("South Western Main Line", ServicePattern::NationalRail, "A", "B"),
            "SOUTH_WESTERN_MAIN_LINE_SERVICE"
        );
        assert_eq!(
            service_id("WALKING", ServicePattern::Walking, "London Kings Cross", "London St Pancras"),
            "WALKING_LONDON_KINGS_CROSS_LONDON_ST_PANCRAS"
        );
        assert_eq!(upper_snake("  King's Cross (Main) "), "KING_S_CROSS_MAIN");
    }

    #[test]
    fn single_segment_route() {
        let route = Route::from_segments(vec![rail("A", "C", "L1", 20)], 5).unwrap();

        assert_eq!(route.from_station(), "A");
        assert_eq!(route.to_station(), "C");
        assert_eq!(route.total_journey_time_minutes(), 20);
        assert_eq!(route.changes_required(), 0);
        assert!(route.is_direct());
        assert_eq!(route.full_path(), &["A", "C"]);
        assert!(route.intermediate_stations().is_empty());
    }

    #[test]
    fn changes_follow_boundaries() {
        let segments = vec![
            rail("A", "B", "L1", 10),
            rail("B", "C", "L2", 10).with_direct(true),
            rail("C", "D", "L3", 10),
        ];
        let route = Route::from_segments(segments, 5).unwrap();

        // B→C is a through service, so only C is a change
        assert_eq!(route.changes_required(), 1);
        assert_eq!(route.total_journey_time_minutes(), 35);
        assert_eq!(route.intermediate_stations(), &["B", "C"]);
        assert_eq!(route.lines_used(), vec!["L1", "L2", "L3"]);
    }

    #[test]
    fn same_line_boundaries_are_not_changes() {
        let walk = |from: &str, to: &str| RouteSegment::new(from, to, "WALKING", 0.3, 3, ServicePattern::Walking);
        let segments = vec![rail("A", "B", "L1", 10), walk("B", "C"), walk("C", "D"), rail("D", "E", "L1", 10)];
        let route = Route::from_segments(segments, 5).unwrap();

        assert_eq!(route.changes_required(), 2);
        assert_eq!(route.total_journey_time_minutes(), 36);
    }

    #[test]
    fn gaps_are_rejected() {
        let err = Route::from_segments(vec![rail("A", "B", "L1", 10), rail("C", "D", "L2", 10)], 5)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::NotContiguous {
                index: 0,
                ends_at: "B".into(),
                starts_at: "C".into(),
            }
        );
    }

    #[test]
    fn endpoints_must_match() {
        let err = Route::new("X", "B", vec![rail("A", "B", "L1", 10)], 10.0, 10, vec![])
            .unwrap_err();
        assert!(matches!(err, DomainError::EndpointMismatch { .. }));

        assert_eq!(
            Route::from_segments(vec![], 5).unwrap_err(),
            DomainError::EmptyRoute
        );
    }

    #[test]
    fn display() {
        let route = Route::from_segments(vec![rail("Woking", "Guildford", "New Guildford Line", 8)], 5)
            .unwrap();
        assert_eq!(route.to_string(), "Woking → Guildford (8 min, 10.0 km, 0 changes)");
    }
}
