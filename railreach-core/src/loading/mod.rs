//! This module reads the station and direct-time tables and builds the
//! compact graph the propagators run on.

mod builder;
mod tables;

pub use builder::load_transit_graph;
pub use tables::{CsvGraphSource, read_direct_times, read_stations};
