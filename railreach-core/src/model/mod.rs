//! Data model for reachability computation
//!
//! Contains the immutable network inputs (stations and direct times), the
//! indexed graph built from them and the per-station computation results.

pub mod direct_time;
pub mod graph;
pub mod isochrone;
pub mod station;
pub mod travel_times;

pub use direct_time::{DirectTime, EdgeSource};
pub use graph::{Edge, TransitGraph};
pub use isochrone::Isochrone;
pub use station::Station;
pub use travel_times::{ShortestTimes, TravelTimes};
