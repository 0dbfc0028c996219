use std::{cmp::Ordering, collections::BinaryHeap};

use super::state::ArrivalTimes;
use crate::{Minutes, PropagationConfig, TransitGraph};

#[derive(Copy, Clone, Eq, PartialEq)]
struct State {
    cost: Minutes,
    hops: usize,
    node: usize,
}

// Min-heap by cost, fewer hops first on ties
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Label-setting search over `(station, edges used)` states
///
/// Uses the same penalty model, hop ceiling and expansion cutoff as the
/// round-based variant, but keeps every non-dominated label, so the result
/// is the minimum over all paths with at most `max_interchanges` edges.
pub(crate) fn exact_relaxation(
    graph: &TransitGraph,
    source: usize,
    config: &PropagationConfig,
) -> ArrivalTimes {
    let num_nodes = graph.node_count();
    let max_hops = config.max_interchanges;
    let mut arrivals = ArrivalTimes::new(num_nodes, source);

    // best[h][node]: cheapest arrival using exactly h edges
    let mut best = vec![vec![Minutes::MAX; num_nodes]; max_hops + 1];
    best[0][source] = 0;

    let mut heap = BinaryHeap::new();
    heap.push(State {
        cost: 0,
        hops: 0,
        node: source,
    });

    while let Some(State { cost, hops, node }) = heap.pop() {
        // Skip if we've found a better label
        if cost > best[hops][node] {
            continue;
        }
        if hops == max_hops || (node != source && cost >= config.max_duration) {
            continue;
        }

        for edge in graph.edges_from(node) {
            let next_cost = cost
                .saturating_add(config.interchange_penalty(hops, edge.source))
                .saturating_add(edge.duration);
            let next_hops = hops + 1;

            // A label with fewer edges and no higher cost dominates
            let dominated = best[..=next_hops]
                .iter()
                .any(|layer| layer[edge.target] <= next_cost);
            if dominated {
                continue;
            }

            best[next_hops][edge.target] = next_cost;
            arrivals.improve(edge.target, next_cost);
            heap.push(State {
                cost: next_cost,
                hops: next_hops,
                node: edge.target,
            });
        }
    }

    arrivals
}
