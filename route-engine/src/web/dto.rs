//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Route, RouteSegment, ServicePattern};
use crate::planner::RoutePreferences;

/// Default number of alternatives for `/routes`.
pub const DEFAULT_MAX_ROUTES: usize = 3;

/// Largest number of alternatives a caller may ask for.
pub const MAX_ROUTES_LIMIT: usize = 10;

/// Request for one route (`/route`) or alternatives (`/routes`).
#[derive(Debug, Default, Deserialize)]
pub struct RouteRequest {
    /// Origin station name
    pub from: String,

    /// Destination station name
    pub to: String,

    /// Reject routes with more changes than this
    pub max_changes: Option<u32>,

    /// Number of alternatives (`/routes` only)
    pub max_routes: Option<usize>,

    pub avoid_walking: Option<bool>,
    pub prefer_direct: Option<bool>,
    pub avoid_london: Option<bool>,
    pub max_walking_distance_km: Option<f64>,
}

impl RouteRequest {
    /// The preferences the request sets, or `None` if it sets none.
    pub fn preferences(&self) -> Option<RoutePreferences> {
        if self.avoid_walking.is_none()
            && self.prefer_direct.is_none()
            && self.avoid_london.is_none()
            && self.max_walking_distance_km.is_none()
        {
            return None;
        }

        let defaults = RoutePreferences::default();
        Some(RoutePreferences::new(
            self.avoid_walking.unwrap_or(defaults.avoid_walking),
            self.prefer_direct.unwrap_or(defaults.prefer_direct),
            self.avoid_london.unwrap_or(defaults.avoid_london),
            self.max_walking_distance_km
                .unwrap_or(defaults.max_walking_distance_km),
        ))
    }

    /// Requested alternatives, defaulted and capped.
    pub fn max_routes(&self) -> usize {
        self.max_routes
            .unwrap_or(DEFAULT_MAX_ROUTES)
            .clamp(1, MAX_ROUTES_LIMIT)
    }
}

/// Request for stations reachable from an origin.
#[derive(Debug, Deserialize)]
pub struct DestinationsRequest {
    pub from: String,
    pub max_changes: Option<u32>,
}

/// Request for round trips from a station.
#[derive(Debug, Deserialize)]
pub struct CircularRequest {
    pub station: String,
    pub max_distance_km: Option<f64>,
}

/// A segment in a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentResult {
    pub from_station: String,
    pub to_station: String,
    pub line_name: String,
    pub distance_km: f64,
    pub journey_time_minutes: u32,
    pub service_pattern: ServicePattern,
    pub service_id: String,
    pub is_direct: bool,
}

impl SegmentResult {
    pub fn from_segment(segment: &RouteSegment) -> Self {
        Self {
            from_station: segment.from_station.clone(),
            to_station: segment.to_station.clone(),
            line_name: segment.line_name.clone(),
            distance_km: round_km(segment.distance_km),
            journey_time_minutes: segment.journey_time_minutes,
            service_pattern: segment.service_pattern,
            service_id: segment.service_id.clone(),
            is_direct: segment.is_direct,
        }
    }
}

/// A route in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub from_station: String,
    pub to_station: String,
    pub total_distance_km: f64,
    pub total_journey_time_minutes: u32,
    pub changes_required: u32,
    pub lines_used: Vec<String>,
    pub full_path: Vec<String>,
    pub segments: Vec<SegmentResult>,

    /// Estimated fare in pounds
    pub estimated_cost: f64,
}

impl RouteResult {
    pub fn from_route(route: &Route, estimated_cost: f64) -> Self {
        Self {
            from_station: route.from_station().to_string(),
            to_station: route.to_station().to_string(),
            total_distance_km: round_km(route.total_distance_km()),
            total_journey_time_minutes: route.total_journey_time_minutes(),
            changes_required: route.changes_required(),
            lines_used: route.lines_used().into_iter().map(str::to_string).collect(),
            full_path: route.full_path().to_vec(),
            segments: route.segments().iter().map(SegmentResult::from_segment).collect(),
            estimated_cost: (estimated_cost * 100.0).round() / 100.0,
        }
    }
}

/// Several routes.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteResult>,
}

/// Stations reachable from an origin.
#[derive(Debug, Serialize)]
pub struct DestinationsResponse {
    pub from: String,
    pub max_changes: u32,
    pub destinations: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Distances to the nearest 10 m.
fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
