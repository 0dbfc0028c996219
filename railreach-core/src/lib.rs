//! Offline reachability pipeline for sparse transit networks.
//!
//! For every station the pipeline propagates travel times over the
//! direct-time graph, grows nested isochrone polygons out of the reached
//! stations and persists both the polygons and a flat shortest-time table.

pub mod algo;
pub mod batch;
pub mod config;
mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod storage;

pub use error::Error;

/// Station identifier as stored in the relational store
pub type StationId = i64;
/// Travel time in whole minutes
pub type Minutes = u32;

pub use algo::isochrone::{IsochroneRun, bulk_isochrones, calculate_isochrones};
pub use algo::shortest_times::shortest_times;
pub use batch::{BatchDriver, Job, RunSummary};
pub use export::{ExportSummary, export_shortest_times, export_station_isochrones};
pub use config::{
    BatchConfig, IsochroneConfig, PipelineConfig, PropagationConfig, PropagationStrategy,
};
pub use loading::load_transit_graph;
pub use model::{DirectTime, EdgeSource, Isochrone, ShortestTimes, Station, TransitGraph, TravelTimes};
pub use routing::propagate;
pub use storage::{GraphSource, ResultStore, SqliteStore};
