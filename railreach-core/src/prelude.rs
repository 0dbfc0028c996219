// Re-export key components
pub use crate::algo::isochrone::{IsochroneBuilder, IsochroneRun, calculate_isochrones};
pub use crate::algo::shortest_times::shortest_times;
pub use crate::batch::{BatchDriver, Job, RunSummary};
pub use crate::config::{
    BatchConfig, IsochroneConfig, PipelineConfig, PropagationConfig, PropagationStrategy,
};
pub use crate::loading::{CsvGraphSource, load_transit_graph};
pub use crate::model::{
    DirectTime, EdgeSource, Isochrone, ShortestTimes, Station, TransitGraph, TravelTimes,
};
pub use crate::routing::propagate;
pub use crate::storage::{GraphSource, ResultStore, SqliteStore};

// Core scalar types
pub use crate::Error;
pub use crate::Minutes;
pub use crate::StationId;
