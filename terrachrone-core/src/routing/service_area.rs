use geo::{MultiLineString, Point};
use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, trace};
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::dijkstra::multi_source_costs;
use super::{Coverage, ReachabilityEngine, ReachableSubnetwork, ReachedEdge, TravelStrategy, line_substring};
use crate::Error;
use crate::model::{EdgeSnap, WeightedGraph};

/// Fractions closer than this are treated as touching
const FRACTION_TOLERANCE: f64 = 1e-9;

/// Multi-source Dijkstra service area with partial edges
///
/// Origins are snapped onto the nearest edge; both endpoints of that edge
/// are seeded with the cost of travelling along it from the snapped point.
/// Weight is assumed to spread uniformly along an edge, so an edge only
/// partly within the ceiling is cut at the fraction where the budget runs
/// out.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraServiceArea;

impl ReachabilityEngine for DijkstraServiceArea {
    fn reachable(
        &self,
        graph: &WeightedGraph,
        origins: &[Point<f64>],
        budget: f64,
        strategy: TravelStrategy,
    ) -> Result<ReachableSubnetwork, Error> {
        if graph.is_empty() {
            return Err(Error::NoEdgesFound);
        }
        let ceiling = strategy.ceiling(budget);
        if origins.is_empty() || !(ceiling > 0.0) {
            return Ok(ReachableSubnetwork::default());
        }

        let snaps = origins
            .iter()
            .map(|origin| graph.nearest_edge(*origin).ok_or(Error::NoEdgesFound))
            .collect::<Result<Vec<EdgeSnap>, Error>>()?;

        let mut seeds: Vec<(NodeIndex, f64)> = Vec::with_capacity(snaps.len() * 2);
        let mut on_edge: HashMap<EdgeIndex, Vec<f64>> = HashMap::new();
        for snap in &snaps {
            let (Some((start, end)), Some(edge)) = (graph.endpoints(snap.edge), graph.edge(snap.edge)) else {
                return Err(Error::Reachability(format!("edge {:?} vanished from graph", snap.edge)));
            };
            let weight = edge.weight(strategy);
            seeds.push((start, snap.fraction * weight));
            seeds.push((end, (1.0 - snap.fraction) * weight));
            on_edge.entry(snap.edge).or_default().push(snap.fraction);
        }

        let costs = multi_source_costs(graph, &seeds, strategy, ceiling);
        trace!("Service area settled {} nodes within {ceiling}", costs.len());

        let mut edges = Vec::new();
        for index in graph.edge_indices() {
            let (Some((start, end)), Some(edge)) = (graph.endpoints(index), graph.edge(index)) else {
                continue;
            };
            let origin_fractions = on_edge.get(&index).map(Vec::as_slice).unwrap_or_default();
            let from_start = costs.get(&start).copied();
            let from_end = costs.get(&end).copied();
            if from_start.is_none() && from_end.is_none() && origin_fractions.is_empty() {
                continue;
            }

            let Some(coverage) = edge_coverage(
                edge.weight(strategy),
                ceiling,
                from_start,
                from_end,
                origin_fractions,
            ) else {
                continue;
            };

            let geometry = match &coverage {
                Coverage::Full => MultiLineString::new(vec![edge.geometry.clone()]),
                Coverage::Partial(intervals) => MultiLineString::new(
                    intervals
                        .iter()
                        .filter_map(|&(a, b)| line_substring(&edge.geometry, a, b))
                        .collect(),
                ),
            };
            if geometry.0.is_empty() {
                continue;
            }

            edges.push(ReachedEdge {
                source_id: edge.source_id,
                coverage,
                geometry,
            });
        }

        debug!(
            "{} origin(s), budget {budget} ({strategy:?}): {} edges reached",
            origins.len(),
            edges.len()
        );
        Ok(ReachableSubnetwork { edges })
    }
}

/// Covered part of one edge, `None` when nothing of it is within the ceiling
fn edge_coverage(
    weight: f64,
    ceiling: f64,
    from_start: Option<f64>,
    from_end: Option<f64>,
    origin_fractions: &[f64],
) -> Option<Coverage> {
    if weight <= 0.0 {
        return Some(Coverage::Full);
    }

    let mut intervals: Vec<(f64, f64)> = Vec::with_capacity(2 + origin_fractions.len());
    if let Some(cost) = from_start.filter(|c| *c <= ceiling) {
        intervals.push((0.0, (ceiling - cost) / weight));
    }
    if let Some(cost) = from_end.filter(|c| *c <= ceiling) {
        intervals.push((1.0 - (ceiling - cost) / weight, 1.0));
    }
    let reach = ceiling / weight;
    for fraction in origin_fractions {
        intervals.push((fraction - reach, fraction + reach));
    }

    let merged = merge_intervals(intervals);
    match merged.as_slice() {
        [] => None,
        [(a, b)] if *a <= FRACTION_TOLERANCE && *b >= 1.0 - FRACTION_TOLERANCE => Some(Coverage::Full),
        _ => Some(Coverage::Partial(merged)),
    }
}

/// Clamp to `[0, 1]`, drop empty intervals and merge overlapping ones
fn merge_intervals(intervals: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(intervals.len());
    for (a, b) in intervals
        .into_iter()
        .map(|(a, b)| (a.clamp(0.0, 1.0), b.clamp(0.0, 1.0)))
        .filter(|(a, b)| b - a > FRACTION_TOLERANCE)
        .sorted_by(|x, y| x.0.total_cmp(&y.0))
    {
        match merged.last_mut() {
            Some(last) if a <= last.1 + FRACTION_TOLERANCE => last.1 = last.1.max(b),
            _ => merged.push((a, b)),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use geo::{Euclidean, Length, LineString, line_string};

    use super::*;
    use crate::model::WeightedEdge;

    fn edge(id: u64, geometry: LineString<f64>, delta_h: f64) -> WeightedEdge {
        let length = Euclidean.length(&geometry);
        let cost = length + 5.0 * delta_h;
        WeightedEdge {
            source_id: id,
            geometry,
            length,
            delta_h,
            cost,
            effective_speed: 3.6 * length / (cost + 0.001),
        }
    }

    /// Three 100 m arms from the origin, the northern one extended to 200 m
    fn cross() -> WeightedGraph {
        WeightedGraph::from_edges(vec![
            edge(1, line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)], 0.0),
            edge(2, line_string![(x: 0.0, y: 0.0), (x: -100.0, y: 0.0)], 0.0),
            edge(3, line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 100.0)], 0.0),
            edge(4, line_string![(x: 0.0, y: 100.0), (x: 0.0, y: 200.0)], 0.0),
        ])
    }

    #[test]
    fn budget_exhausted_mid_edge_cuts_it() {
        let area = DijkstraServiceArea
            .reachable(&cross(), &[Point::new(0.0, 0.0)], 150.0, TravelStrategy::Distance)
            .unwrap();
        assert_eq!(area.len(), 4);
        let tip = area.edges.iter().find(|e| e.source_id == 4).unwrap();
        assert_eq!(tip.coverage, Coverage::Partial(vec![(0.0, 0.5)]));
        assert!((area.covered_length() - 350.0).abs() < 1e-6);
    }

    #[test]
    fn origin_inside_an_edge_grows_both_ways() {
        let graph = WeightedGraph::from_edges(vec![edge(
            9,
            line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)],
            0.0,
        )]);
        let area = DijkstraServiceArea
            .reachable(&graph, &[Point::new(500.0, 20.0)], 100.0, TravelStrategy::Distance)
            .unwrap();
        assert_eq!(area.len(), 1);
        assert_eq!(area.edges[0].coverage, Coverage::Partial(vec![(0.4, 0.6)]));
        assert!((area.covered_length() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn steep_edge_drops_out_first() {
        let graph = WeightedGraph::from_edges(vec![
            edge(1, line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)], 0.0),
            edge(2, line_string![(x: 0.0, y: 0.0), (x: -100.0, y: 0.0)], 20.0),
        ]);
        let origin = [Point::new(0.0, 0.0)];
        let area = DijkstraServiceArea
            .reachable(&graph, &origin, 100.0, TravelStrategy::Distance)
            .unwrap();
        let flat = area.edges.iter().find(|e| e.source_id == 1).unwrap();
        let steep = area.edges.iter().find(|e| e.source_id == 2).unwrap();
        assert!(flat.coverage.is_full());
        assert_eq!(steep.coverage, Coverage::Partial(vec![(0.0, 0.5)]));
    }

    #[test]
    fn union_of_several_origins() {
        let graph = WeightedGraph::from_edges(vec![edge(
            1,
            line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)],
            0.0,
        )]);
        let origins = [Point::new(0.0, 0.0), Point::new(1000.0, 0.0)];
        let area = DijkstraServiceArea
            .reachable(&graph, &origins, 100.0, TravelStrategy::Distance)
            .unwrap();
        assert_eq!(area.edges[0].coverage, Coverage::Partial(vec![(0.0, 0.1), (0.9, 1.0)]));
        assert_eq!(area.edges[0].geometry.0.len(), 2);
    }

    #[test]
    fn time_strategy_uses_seconds() {
        // 3.6 km/h is 1 m/s, so one minute covers 60 m of flat edge
        let area = DijkstraServiceArea
            .reachable(&cross(), &[Point::new(0.0, 0.0)], 1.0, TravelStrategy::Time)
            .unwrap();
        assert!((area.covered_length() - 180.0).abs() < 0.1);
    }

    #[test]
    fn zero_budget_is_empty_not_an_error() {
        let area = DijkstraServiceArea
            .reachable(&cross(), &[Point::new(0.0, 0.0)], 0.0, TravelStrategy::Distance)
            .unwrap();
        assert!(area.is_empty());
    }

    #[test]
    fn empty_graph_is_an_error() {
        let graph = WeightedGraph::from_edges(Vec::new());
        let result = DijkstraServiceArea.reachable(
            &graph,
            &[Point::new(0.0, 0.0)],
            10.0,
            TravelStrategy::Distance,
        );
        assert!(matches!(result, Err(Error::NoEdgesFound)));
    }

    #[test]
    fn merge_joins_touching_intervals() {
        assert_eq!(
            merge_intervals(vec![(0.5, 0.9), (-0.2, 0.3), (0.3, 0.5), (1.2, 1.5)]),
            vec![(0.0, 0.9)]
        );
    }
}
