use fixedbitset::FixedBitSet;
use log::trace;

use super::state::ArrivalTimes;
use crate::{PropagationConfig, TransitGraph};

/// Round-based relaxation settling every station after its first frontier
/// membership
///
/// Round `r` relaxes the edges leaving the current frontier, paying the
/// interchange penalty from the second round on. A destination joins the
/// next frontier when its time stays below `max_duration` and it has not
/// been a frontier member before. A settled station is never improved again,
/// even if a later round finds a cheaper route to it.
///
/// Frontier members are relaxed from their live arrival time. When a member
/// is improved by an earlier member of the same round, the improvement flows
/// through its own edges in that round already, so a time may stem from a
/// path longer than `max_interchanges` edges and depends on edge order.
pub(crate) fn bounded_rounds(
    graph: &TransitGraph,
    source: usize,
    config: &PropagationConfig,
) -> ArrivalTimes {
    let num_nodes = graph.node_count();
    let mut arrivals = ArrivalTimes::new(num_nodes, source);

    let mut frontier = vec![source];
    let mut settled = FixedBitSet::with_capacity(num_nodes);
    let mut reached = FixedBitSet::with_capacity(num_nodes);

    let mut round = 0;
    while round < config.max_interchanges && !frontier.is_empty() {
        reached.clear();
        let mut reached_order = Vec::new();

        for &origin in &frontier {
            let Some(origin_time) = arrivals.get(origin) else {
                continue;
            };
            for edge in graph.edges_from(origin) {
                if settled.contains(edge.target) {
                    continue;
                }
                let candidate = origin_time
                    .saturating_add(config.interchange_penalty(round, edge.source))
                    .saturating_add(edge.duration);
                arrivals.improve(edge.target, candidate);
                if !reached.put(edge.target) {
                    reached_order.push(edge.target);
                }
            }
        }

        for &origin in &frontier {
            settled.insert(origin);
        }

        frontier = reached_order
            .into_iter()
            .filter(|&node| {
                !settled.contains(node)
                    && arrivals
                        .get(node)
                        .is_some_and(|time| time < config.max_duration)
            })
            .collect();

        trace!("Round {round}: {} stations in next frontier", frontier.len());
        round += 1;
    }

    arrivals
}
