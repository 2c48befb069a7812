//! Web layer for the route engine.
//!
//! A JSON API over one [`RouteService`](crate::service::RouteService).

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
