use std::net::SocketAddr;

use route_engine::planner::EngineConfig;
use route_engine::service::RouteService;
use route_engine::web::{AppState, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Where the network data lives unless `ROUTE_ENGINE_DATA_DIR` says otherwise.
const DEFAULT_DATA_DIR: &str = "data";

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = std::env::var("ROUTE_ENGINE_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let addr: SocketAddr = std::env::var("ROUTE_ENGINE_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    info!(data_dir = %data_dir, "Loading network data");
    let mut service = RouteService::load(&data_dir, EngineConfig::default())?;

    // Warm the cache with "from:to" pairs, comma separated
    if let Ok(raw) = std::env::var("ROUTE_ENGINE_WARM_CACHE") {
        let pairs = parse_station_pairs(&raw);
        if pairs.is_empty() {
            warn!(value = %raw, "ROUTE_ENGINE_WARM_CACHE has no from:to pairs");
        } else {
            service.precompute_common_routes(&pairs);
        }
    }

    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Route engine listening");
    info!("API endpoints: GET /health /route /routes /destinations /circular /statistics, POST /cache/clear");

    axum::serve(listener, app).await?;
    Ok(())
}

fn parse_station_pairs(value: &str) -> Vec<(String, String)> {
    value
        .split(',')
        .filter_map(|pair| {
            let (from, to) = pair.split_once(':')?;
            let (from, to) = (from.trim(), to.trim());
            (!from.is_empty() && !to.is_empty()).then(|| (from.to_string(), to.to_string()))
        })
        .collect()
}
