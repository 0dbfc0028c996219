// Travel-time propagation strategies

mod bounded;
mod exact;
mod state;

use log::trace;

use crate::{Error, PropagationConfig, PropagationStrategy, StationId, TransitGraph, TravelTimes};

/// Arrival times from `source` to every station reachable within
/// `config.max_duration`
///
/// # Errors
///
/// Returns [`Error::UnknownStation`] if `source` is not part of the graph.
pub fn propagate(
    graph: &TransitGraph,
    source: StationId,
    config: &PropagationConfig,
) -> Result<TravelTimes, Error> {
    let source_idx = graph
        .index_of(source)
        .ok_or(Error::UnknownStation(source))?;

    let arrivals = match config.strategy {
        PropagationStrategy::BoundedRounds => bounded::bounded_rounds(graph, source_idx, config),
        PropagationStrategy::Exact => exact::exact_relaxation(graph, source_idx, config),
    };

    let times = arrivals.into_travel_times(graph, config.max_duration);
    trace!("Station {source}: {} stations reached", times.len());
    Ok(times)
}
