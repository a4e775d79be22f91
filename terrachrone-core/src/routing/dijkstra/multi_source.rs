use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::model::WeightedGraph;
use crate::routing::TravelStrategy;

/// Dijkstra's algorithm seeded from several nodes at once
///
/// Each seed starts with its own initial cost (the cost of reaching the
/// node from an origin lying on one of its edges). Returns the cheapest
/// cost of every node reachable within `max_cost` from any seed.
pub(crate) fn multi_source_costs(
    graph: &WeightedGraph,
    seeds: &[(NodeIndex, f64)],
    strategy: TravelStrategy,
    max_cost: f64,
) -> HashMap<NodeIndex, f64> {
    let mut costs: HashMap<NodeIndex, f64> = HashMap::with_capacity(seeds.len() * 16);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(seeds.len());

    for &(node, cost) in seeds {
        if cost > max_cost {
            continue;
        }
        let best = costs.entry(node).or_insert(f64::INFINITY);
        if cost < *best {
            *best = cost;
            heap.push(State { cost, node });
        }
    }

    while let Some(State { cost, node }) = heap.pop() {
        // Skip stale heap entries
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + edge.weight().weight(strategy);

            // Check max cost constraint
            if next_cost > max_cost {
                continue;
            }

            match costs.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    costs
}
