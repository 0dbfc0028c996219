use crate::{Error, PropagationConfig, ShortestTimes, StationId, TransitGraph, propagate};

/// Flat table of arrival times from `source`, without any geometry
///
/// Rows keep the propagation's discovery order and never exceed
/// `config.max_duration`.
pub fn shortest_times(
    graph: &TransitGraph,
    source: StationId,
    config: &PropagationConfig,
) -> Result<ShortestTimes, Error> {
    let times = propagate(graph, source, config)?;
    let rows = times
        .iter()
        .filter(|&(_, minutes)| minutes <= config.max_duration)
        .collect();
    Ok(ShortestTimes::new(source, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirectTime, EdgeSource, Minutes, Station};

    fn edge(from: StationId, to: StationId, duration: Minutes) -> DirectTime {
        DirectTime {
            from_station_id: from,
            to_station_id: to,
            duration,
            distance_km: 12.0,
            source: EdgeSource::Network,
        }
    }

    #[test]
    fn table_uses_five_rounds() {
        let edges: Vec<_> = (1..=6).map(|i| edge(i, i + 1, 10)).collect();
        let graph = TransitGraph::new(&[], &edges);

        let table = shortest_times(&graph, 1, &PropagationConfig::for_shortest_times()).unwrap();
        assert_eq!(
            table.rows,
            vec![(1, 0), (2, 10), (3, 40), (4, 70), (5, 100), (6, 130)]
        );
        assert_eq!(table.to_flat()[..4], [1, 0, 2, 10]);
    }

    #[test]
    fn isolated_station_table_holds_only_itself() {
        let graph = TransitGraph::new(&[Station::from_degrees(3, 50.0, 8.0)], &[]);
        let table = shortest_times(&graph, 3, &PropagationConfig::for_shortest_times()).unwrap();
        assert_eq!(table.rows, vec![(3, 0)]);
    }

    #[test]
    fn rows_respect_the_ceiling() {
        let graph = TransitGraph::new(&[], &[edge(1, 2, 290), edge(2, 3, 5), edge(1, 4, 350)]);
        let table = shortest_times(&graph, 1, &PropagationConfig::for_shortest_times()).unwrap();
        assert_eq!(table.rows, vec![(1, 0), (2, 290)]);
    }
}
