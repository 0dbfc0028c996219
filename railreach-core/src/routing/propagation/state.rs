use crate::{Minutes, TransitGraph, TravelTimes};

/// Best known arrival time per node, remembering discovery order
#[derive(Debug)]
pub(crate) struct ArrivalTimes {
    times: Vec<Minutes>,
    discovered: Vec<usize>,
}

impl ArrivalTimes {
    pub(crate) fn new(num_nodes: usize, source: usize) -> Self {
        let mut times = vec![Minutes::MAX; num_nodes];
        times[source] = 0;
        ArrivalTimes {
            times,
            discovered: vec![source],
        }
    }

    pub(crate) fn get(&self, node: usize) -> Option<Minutes> {
        self.times.get(node).copied().filter(|&t| t != Minutes::MAX)
    }

    /// Records `candidate` if it beats the current time, returns whether it did
    pub(crate) fn improve(&mut self, node: usize, candidate: Minutes) -> bool {
        let current = self.times[node];
        if candidate >= current {
            return false;
        }
        if current == Minutes::MAX {
            self.discovered.push(node);
        }
        self.times[node] = candidate;
        true
    }

    /// Keeps arrivals within `max_duration`, translated to station ids
    pub(crate) fn into_travel_times(
        self,
        graph: &TransitGraph,
        max_duration: Minutes,
    ) -> TravelTimes {
        let source = graph.station_id(self.discovered[0]);
        let entries = self
            .discovered
            .iter()
            .map(|&node| (graph.station_id(node), self.times[node]))
            .filter(|&(_, time)| time <= max_duration)
            .collect();
        TravelTimes::new(source, entries)
    }
}
