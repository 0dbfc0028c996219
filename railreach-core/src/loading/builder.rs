use log::{info, warn};

use crate::storage::GraphSource;
use crate::{Error, TransitGraph};

/// Reads stations and direct times from `source` and builds the graph
///
/// # Errors
///
/// Returns an error if the source cannot be read or holds no stations
pub fn load_transit_graph(source: &impl GraphSource) -> Result<TransitGraph, Error> {
    let stations = source.stations()?;
    if stations.is_empty() {
        return Err(Error::DataIntegrity(
            "No stations found in the graph source".to_string(),
        ));
    }
    let direct_times = source.direct_times()?;
    info!(
        "Loaded {} stations and {} direct times",
        stations.len(),
        direct_times.len()
    );

    let zero_duration = direct_times.iter().filter(|e| e.duration == 0).count();
    if zero_duration > 0 {
        warn!("{zero_duration} direct times have a duration of zero minutes");
    }

    let graph = TransitGraph::new(&stations, &direct_times);

    let missing = graph.missing_coordinates();
    if missing > 0 {
        warn!(
            "{missing} of {} stations referenced by direct times have no coordinates. \
             Their isochrones cannot be built.",
            graph.node_count()
        );
    }

    info!(
        "Transit graph built: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirectTime, EdgeSource, Station};

    struct InMemory {
        stations: Vec<Station>,
        direct_times: Vec<DirectTime>,
    }

    impl GraphSource for InMemory {
        fn stations(&self) -> Result<Vec<Station>, Error> {
            Ok(self.stations.clone())
        }

        fn direct_times(&self) -> Result<Vec<DirectTime>, Error> {
            Ok(self.direct_times.clone())
        }
    }

    #[test]
    fn builds_graph_from_source() {
        let source = InMemory {
            stations: vec![
                Station::from_degrees(1, 50.0, 8.0),
                Station::from_degrees(2, 50.1, 8.1),
            ],
            direct_times: vec![DirectTime {
                from_station_id: 1,
                to_station_id: 3,
                duration: 15,
                distance_km: 10.0,
                source: EdgeSource::Network,
            }],
        };
        let graph = load_transit_graph(&source).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.missing_coordinates(), 1);
    }

    #[test]
    fn empty_source_is_rejected() {
        let source = InMemory {
            stations: Vec::new(),
            direct_times: Vec::new(),
        };
        assert!(matches!(
            load_transit_graph(&source),
            Err(Error::DataIntegrity(_))
        ));
    }
}
