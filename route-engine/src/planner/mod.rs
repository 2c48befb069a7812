//! Route search over the network graph.
//!
//! A Dijkstra variant with three objectives (time, distance, fewest
//! changes). Which connection to take between two stations is decided by a
//! tiered comparator; the queue is ordered by an objective weight that
//! folds in interchange time, walking and underground adjustments.

mod config;
mod node;
mod scoring;
mod search;

pub use config::{EngineConfig, Objective, RoutePreferences};
pub use node::PathNode;
pub use scoring::{ConnectionTier, SearchContext};
pub use search::PathfindingAlgorithm;
