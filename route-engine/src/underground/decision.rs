//! When to route a journey as an underground black box.

use std::fmt;

use crate::data::RailwayData;

use super::classifier::StationClassifier;
use super::systems::UndergroundSystem;

/// How a journey relates to the underground systems.
///
/// Decided from the systems each end belongs to and whether national rail
/// serves it. Only some outcomes replace graph search with a macro
/// segment; see [`BlackBoxDecision::uses_black_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackBoxDecision {
    /// The destination is a rail-served terminal of its system and national
    /// rail serves the origin: search the rail graph.
    PreferNationalRail,

    /// Both ends on one system: a single macro segment.
    SameSystem(UndergroundSystem),

    /// Each end on a different system: underground, rail, underground.
    DifferentSystems {
        from: UndergroundSystem,
        to: UndergroundSystem,
    },

    /// Destination reachable only by underground: rail to a terminus, then
    /// a macro segment.
    DestinationUndergroundOnly(UndergroundSystem),

    /// Destination on a system but also served by rail: search the graph.
    DestinationServedByRail(UndergroundSystem),

    /// Origin reachable only by underground and destination on national
    /// rail: a macro segment to a terminus, then rail.
    OriginUndergroundOnly(UndergroundSystem),

    /// Neither end involves an underground system in a way that matters.
    NotApplicable,
}

impl BlackBoxDecision {
    /// Classify a journey.
    pub fn decide(from: &str, to: &str, classifier: &StationClassifier, data: &dyn RailwayData) -> Self {
        let from_system = classifier.underground_system(from);
        let to_system = classifier.underground_system(to);

        if let Some(system) = to_system
            && classifier.is_system_terminal(to, system)
            && data.validate_station_exists(from)
            && data.validate_station_exists(to)
        {
            return BlackBoxDecision::PreferNationalRail;
        }

        match (from_system, to_system) {
            (Some(f), Some(t)) if f == t => BlackBoxDecision::SameSystem(t),
            (Some(f), Some(t)) => BlackBoxDecision::DifferentSystems { from: f, to: t },
            (None, Some(t)) if classifier.is_underground_only(to, data) => {
                BlackBoxDecision::DestinationUndergroundOnly(t)
            }
            (None, Some(t)) => BlackBoxDecision::DestinationServedByRail(t),
            (Some(f), None) if classifier.is_underground_only(from, data) && data.validate_station_exists(to) => {
                BlackBoxDecision::OriginUndergroundOnly(f)
            }
            _ => BlackBoxDecision::NotApplicable,
        }
    }

    /// Whether the journey is answered by a macro segment rather than graph
    /// search.
    pub fn uses_black_box(&self) -> bool {
        matches!(
            self,
            BlackBoxDecision::SameSystem(_)
                | BlackBoxDecision::DestinationUndergroundOnly(_)
                | BlackBoxDecision::OriginUndergroundOnly(_)
        )
    }
}

impl fmt::Display for BlackBoxDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlackBoxDecision::PreferNationalRail => write!(f, "prefer national rail"),
            BlackBoxDecision::SameSystem(s) => write!(f, "same system ({s})"),
            BlackBoxDecision::DifferentSystems { from, to } => write!(f, "different systems ({from} to {to})"),
            BlackBoxDecision::DestinationUndergroundOnly(s) => write!(f, "destination {s} only"),
            BlackBoxDecision::DestinationServedByRail(s) => write!(f, "destination on {s} and national rail"),
            BlackBoxDecision::OriginUndergroundOnly(s) => write!(f, "origin {s} only"),
            BlackBoxDecision::NotApplicable => write!(f, "not applicable"),
        }
    }
}
