//! Algorithms built on top of travel-time propagation

pub mod geometry;
pub mod isochrone;
pub mod shortest_times;
