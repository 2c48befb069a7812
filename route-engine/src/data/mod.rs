//! Network reference data.
//!
//! Loads railway lines, stations and walking links from JSON documents and
//! answers the lookups the routing engine needs. Malformed files are logged
//! and skipped so a partial network still loads.

mod error;
mod files;
mod names;
mod repository;

pub use error::DataError;
pub use files::{INTERCHANGE_FILE, LINE_INDEX_FILE, WalkingLink};
pub use names::StationNameNormalizer;
pub(crate) use repository::read_optional;
pub use repository::{LoadSummary, NetworkStatistics, RailwayData, StationLineRepository};
