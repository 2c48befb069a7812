//! Domain types for the route engine.
//!
//! This module contains the core domain model types: stations, railway
//! lines and the routes computed over them. Lines and routes enforce their
//! invariants at construction time, so code that receives these types can
//! trust their validity.

mod error;
mod line;
mod route;
mod station;

pub use error::DomainError;
pub use line::{LineStatus, LineType, RailwayLine};
pub use route::{Route, RouteSegment, ServicePattern, count_changes, service_id};
pub(crate) use route::upper_snake;
pub use station::{Coordinates, Station, is_london_name};
