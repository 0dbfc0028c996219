//! Backlog-driven batch processing of stations

mod driver;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use driver::{BatchDriver, RunSummary};

use crate::algo::isochrone::{IsochroneRun, calculate_isochrones};
use crate::config::PipelineConfig;
use crate::routing::propagate;
use crate::{Error, ShortestTimes, StationId, TransitGraph, shortest_times};

/// Result family computed by a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    Isochrones,
    ShortestTimes,
}

impl Job {
    pub fn as_str(self) -> &'static str {
        match self {
            Job::Isochrones => "isochrones",
            Job::ShortestTimes => "shortest-times",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one station computation, before persistence
#[derive(Debug)]
pub(crate) enum StationOutput {
    Isochrones(IsochroneRun),
    ShortestTimes {
        station_id: StationId,
        table: Result<ShortestTimes, Error>,
    },
}

impl StationOutput {
    pub(crate) fn station_id(&self) -> StationId {
        match self {
            StationOutput::Isochrones(run) => run.station_id,
            StationOutput::ShortestTimes { station_id, .. } => *station_id,
        }
    }
}

/// Pure computation for one station, safe to run on any worker thread
pub(crate) fn compute_station(
    graph: &TransitGraph,
    station_id: StationId,
    job: Job,
    config: &PipelineConfig,
) -> StationOutput {
    match job {
        Job::Isochrones => {
            let run = match propagate(graph, station_id, &config.propagation) {
                Ok(times) => calculate_isochrones(
                    graph,
                    &times,
                    &config.isochrones,
                    config.propagation.interchange_time,
                ),
                Err(error) => IsochroneRun {
                    station_id,
                    isochrones: Vec::new(),
                    error: Some(error),
                },
            };
            StationOutput::Isochrones(run)
        }
        Job::ShortestTimes => StationOutput::ShortestTimes {
            station_id,
            table: shortest_times(graph, station_id, &config.shortest_times),
        },
    }
}
