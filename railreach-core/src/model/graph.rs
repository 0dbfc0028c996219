//! Index-based direct-time graph shared read-only by all station computations

use geo::Point;
use hashbrown::HashMap;

use super::{DirectTime, EdgeSource, Station};
use crate::{Error, Minutes, StationId};

/// Outgoing edge in the compressed adjacency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Index of the destination node
    pub target: usize,
    pub duration: Minutes,
    pub source: EdgeSource,
}

/// Direct-time graph in compressed sparse row form
///
/// Nodes cover every station id from the station table and every id
/// referenced by an edge. Ids referenced only by edges have no coordinate.
#[derive(Debug, Clone, Default)]
pub struct TransitGraph {
    /// Station id for each node index
    ids: Vec<StationId>,
    /// Coordinates for each node, `None` when the station table has no row
    coordinates: Vec<Option<Point<f64>>>,
    /// Mapping station ids to node indices
    index: HashMap<StationId, usize>,
    /// Start of each node's edge slice, `ids.len() + 1` entries
    edge_offsets: Vec<usize>,
    /// All edges grouped by origin node
    edges: Vec<Edge>,
}

impl TransitGraph {
    pub fn new(stations: &[Station], direct_times: &[DirectTime]) -> Self {
        let mut graph = TransitGraph::default();

        for station in stations {
            let idx = graph.intern(station.id);
            graph.coordinates[idx] = Some(station.point());
        }

        let endpoints: Vec<(usize, usize)> = direct_times
            .iter()
            .map(|edge| {
                (
                    graph.intern(edge.from_station_id),
                    graph.intern(edge.to_station_id),
                )
            })
            .collect();

        // Counting sort of edges by origin
        let node_count = graph.ids.len();
        let mut counts = vec![0usize; node_count + 1];
        for &(from, _) in &endpoints {
            counts[from + 1] += 1;
        }
        for idx in 0..node_count {
            counts[idx + 1] += counts[idx];
        }
        graph.edge_offsets.clone_from(&counts);

        let mut slots = vec![
            Edge {
                target: 0,
                duration: 0,
                source: EdgeSource::Network,
            };
            direct_times.len()
        ];
        let mut cursor = counts;
        for (edge, &(from, to)) in direct_times.iter().zip(&endpoints) {
            slots[cursor[from]] = Edge {
                target: to,
                duration: edge.duration,
                source: edge.source,
            };
            cursor[from] += 1;
        }
        graph.edges = slots;

        graph
    }

    fn intern(&mut self, id: StationId) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id);
        self.coordinates.push(None);
        self.index.insert(id, idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: StationId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Station id of a node index
    ///
    /// # Panics
    ///
    /// If `idx` is not a node of this graph
    pub fn station_id(&self, idx: usize) -> StationId {
        self.ids[idx]
    }

    pub fn coordinate(&self, idx: usize) -> Option<Point<f64>> {
        self.coordinates.get(idx).copied().flatten()
    }

    /// Location of a station, failing when the station has no coordinate row
    pub fn station_point(&self, id: StationId) -> Result<Point<f64>, Error> {
        let idx = self.index_of(id).ok_or(Error::UnknownStation(id))?;
        self.coordinate(idx).ok_or_else(|| {
            Error::DataIntegrity(format!("station {id} is referenced but has no coordinates"))
        })
    }

    /// Outgoing edges of a node
    pub fn edges_from(&self, idx: usize) -> &[Edge] {
        match (self.edge_offsets.get(idx), self.edge_offsets.get(idx + 1)) {
            (Some(&start), Some(&end)) => &self.edges[start..end],
            _ => &[],
        }
    }

    /// Number of nodes referenced by edges without a coordinate row
    pub fn missing_coordinates(&self) -> usize {
        self.coordinates.iter().filter(|c| c.is_none()).count()
    }
}
