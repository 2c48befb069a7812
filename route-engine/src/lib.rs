//! Route engine for a mixed UK rail network.
//!
//! Plans journeys over national rail lines loaded from JSON documents,
//! treating the London Underground, Glasgow Subway and Tyne and Wear Metro
//! as black boxes: a journey across one is a single estimated segment.

pub mod data;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod service;
pub mod termini;
pub mod underground;
pub mod web;
