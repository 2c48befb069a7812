//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::service::RouteStatistics;

use super::dto::*;
use super::state::AppState;

/// Default limit for circular routes (km).
const DEFAULT_CIRCULAR_DISTANCE_KM: f64 = 100.0;

/// Default change limit for destination searches.
const DEFAULT_DESTINATION_CHANGES: u32 = 2;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/route", get(find_route))
        .route("/routes", get(find_routes))
        .route("/destinations", get(destinations))
        .route("/circular", get(circular_routes))
        .route("/statistics", get(statistics))
        .route("/cache/clear", post(clear_cache))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Best route between two stations.
async fn find_route(
    State(state): State<AppState>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RouteResult>, AppError> {
    require_station("from", &req.from)?;
    require_station("to", &req.to)?;
    let preferences = req.preferences();

    let mut service = state.service.lock().await;
    let route = service
        .calculate_route(&req.from, &req.to, req.max_changes, preferences.as_ref())
        .ok_or_else(|| AppError::NotFound {
            message: format!("No route from {} to {}", req.from, req.to),
        })?;
    let cost = service.calculate_route_cost(&route);

    Ok(Json(RouteResult::from_route(&route, cost)))
}

/// Alternative routes between two stations, best first.
async fn find_routes(
    State(state): State<AppState>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RoutesResponse>, AppError> {
    require_station("from", &req.from)?;
    require_station("to", &req.to)?;
    let preferences = req.preferences();

    let mut service = state.service.lock().await;
    let routes = service.calculate_multiple_routes(
        &req.from,
        &req.to,
        req.max_routes(),
        req.max_changes,
        preferences.as_ref(),
    );
    if routes.is_empty() {
        return Err(AppError::NotFound {
            message: format!("No route from {} to {}", req.from, req.to),
        });
    }

    let routes = routes
        .iter()
        .map(|route| RouteResult::from_route(route, service.calculate_route_cost(route)))
        .collect();
    Ok(Json(RoutesResponse { routes }))
}

/// Stations reachable within a number of changes.
async fn destinations(
    State(state): State<AppState>,
    Query(req): Query<DestinationsRequest>,
) -> Result<Json<DestinationsResponse>, AppError> {
    require_station("from", &req.from)?;
    let max_changes = req.max_changes.unwrap_or(DEFAULT_DESTINATION_CHANGES);

    let mut service = state.service.lock().await;
    let destinations = service.get_possible_destinations(&req.from, max_changes);
    if destinations.is_empty() {
        return Err(AppError::NotFound {
            message: format!("Unknown station or no destinations: {}", req.from),
        });
    }

    Ok(Json(DestinationsResponse {
        from: service.normalize_station(&req.from),
        max_changes,
        destinations,
    }))
}

/// Round trips from a station.
async fn circular_routes(
    State(state): State<AppState>,
    Query(req): Query<CircularRequest>,
) -> Result<Json<RoutesResponse>, AppError> {
    require_station("station", &req.station)?;
    let max_distance_km = req.max_distance_km.unwrap_or(DEFAULT_CIRCULAR_DISTANCE_KM);
    if !max_distance_km.is_finite() || max_distance_km <= 0.0 {
        return Err(AppError::BadRequest {
            message: format!("Invalid max_distance_km: {max_distance_km}"),
        });
    }

    let mut service = state.service.lock().await;
    let routes = service
        .find_circular_routes(&req.station, max_distance_km)
        .iter()
        .map(|route| RouteResult::from_route(route, service.calculate_route_cost(route)))
        .collect();
    Ok(Json(RoutesResponse { routes }))
}

/// Network and engine statistics.
async fn statistics(State(state): State<AppState>) -> Json<RouteStatistics> {
    let mut service = state.service.lock().await;
    Json(service.get_route_statistics())
}

/// Drop cached answers.
async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.service.lock().await.clear_route_cache();
    StatusCode::NO_CONTENT
}

fn require_station(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: format!("Missing station name: {field}"),
        });
    }
    Ok(())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(status = %status, error = %message, "Request failed");
        } else {
            warn!(status = %status, error = %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        let bad = AppError::BadRequest { message: "bad".into() }.into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::NotFound { message: "gone".into() }.into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let internal = AppError::Internal { message: "oops".into() }.into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn station_names_are_required() {
        assert!(require_station("from", "Woking").is_ok());
        assert!(matches!(
            require_station("from", "  "),
            Err(AppError::BadRequest { message }) if message == "Missing station name: from"
        ));
    }
}
