//! Storage collaborators of the pipeline
//!
//! The graph is read once per run through [`GraphSource`]; results are
//! written through [`ResultStore`], whose writes must be idempotent so an
//! interrupted run can simply be started again.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::{DirectTime, Error, Isochrone, Minutes, ShortestTimes, Station, StationId};

/// Read-only source of the network inputs
pub trait GraphSource {
    fn stations(&self) -> Result<Vec<Station>, Error>;
    fn direct_times(&self) -> Result<Vec<DirectTime>, Error>;
}

/// Backlog queries and result persistence
pub trait ResultStore {
    /// Stations lacking an isochrone for any of `thresholds`, highest
    /// priority first
    fn pending_isochrone_stations(
        &self,
        thresholds: &[Minutes],
        limit: usize,
    ) -> Result<Vec<StationId>, Error>;

    /// Stations without any shortest-time row, highest priority first
    fn pending_shortest_time_stations(&self, limit: usize) -> Result<Vec<StationId>, Error>;

    /// Inserts or replaces isochrones keyed by `(station_id, duration)`
    fn upsert_isochrones(&mut self, isochrones: &[Isochrone]) -> Result<(), Error>;

    /// Inserts shortest-time rows, skipping pairs that already exist;
    /// returns the number of new rows
    fn insert_shortest_times(&mut self, table: &ShortestTimes) -> Result<usize, Error>;
}
