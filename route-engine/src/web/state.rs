//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::data::StationLineRepository;
use crate::service::RouteService;

/// Shared application state.
///
/// One route service behind a lock: queries update its caches.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Mutex<RouteService<StationLineRepository>>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(service: RouteService<StationLineRepository>) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
        }
    }
}
