//! Weighted street graph with a spatial index over edge segments

use geo::{BoundingRect, Closest, ClosestPoint, Line, Point, Rect};
use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use rstar::{PointDistance, RTree, primitives::GeomWithData};

use super::components::{GraphNode, WeightedEdge};

/// Position of a segment inside its parent edge
#[derive(Debug, Clone, Copy)]
struct SegmentRef {
    edge: EdgeIndex,
    /// Distance along the edge at the segment start
    offset: f64,
}

type IndexedSegment = GeomWithData<Line<f64>, SegmentRef>;

/// Result of snapping a point onto the network
#[derive(Debug, Clone, Copy)]
pub struct EdgeSnap {
    pub edge: EdgeIndex,
    /// Closest point on the edge
    pub point: Point<f64>,
    /// Distance from the query point to the edge
    pub distance: f64,
    /// Position of the closest point as a fraction of the edge length
    pub fraction: f64,
}

/// Undirected weighted graph derived from the network edges
///
/// Nodes are the distinct endpoint coordinates; edges sharing an endpoint
/// are connected. Built once per run and read concurrently afterwards.
#[derive(Debug)]
pub struct WeightedGraph {
    pub(crate) graph: UnGraph<GraphNode, WeightedEdge>,
    segments: RTree<IndexedSegment>,
}

impl WeightedGraph {
    /// Build the graph, connecting edges whose endpoints coincide exactly
    pub fn from_edges(edges: Vec<WeightedEdge>) -> Self {
        let mut graph = UnGraph::with_capacity(edges.len() + 1, edges.len());
        let mut node_lookup: HashMap<(u64, u64), NodeIndex> = HashMap::new();
        let mut segments = Vec::new();

        for edge in edges {
            let (Some(start), Some(end)) = (edge.geometry.0.first(), edge.geometry.0.last()) else {
                continue;
            };
            let (start, end) = (Point::from(*start), Point::from(*end));
            let source = node_for(&mut graph, &mut node_lookup, start);
            let target = node_for(&mut graph, &mut node_lookup, end);

            let lines: Vec<Line<f64>> = edge.geometry.lines().collect();
            let edge_index = graph.add_edge(source, target, edge);

            let mut offset = 0.0;
            for line in lines {
                let segment_length = line.dx().hypot(line.dy());
                segments.push(GeomWithData::new(
                    line,
                    SegmentRef {
                        edge: edge_index,
                        offset,
                    },
                ));
                offset += segment_length;
            }
        }

        Self {
            graph,
            segments: RTree::bulk_load(segments),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&WeightedEdge> {
        self.graph.edge_weight(index)
    }

    /// Endpoints of an edge in geometry order (start, end)
    pub fn endpoints(&self, index: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(index)
    }

    pub fn edges(&self) -> impl Iterator<Item = &WeightedEdge> {
        self.graph.edge_weights()
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        self.graph.edge_indices()
    }

    /// Nearest point on the network to `point`
    ///
    /// Returns `None` only for an empty network.
    pub fn nearest_edge(&self, point: Point<f64>) -> Option<EdgeSnap> {
        let entry = self.segments.nearest_neighbor(&point)?;
        let distance = entry.distance_2(&point).sqrt();
        let segment = entry.geom();

        let closest = match segment.closest_point(&point) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => p,
            Closest::Indeterminate => segment.start_point(),
        };
        let along = (closest.x() - segment.start.x).hypot(closest.y() - segment.start.y);

        let edge_length = self.graph[entry.data.edge].length;
        let fraction = if edge_length > 0.0 {
            ((entry.data.offset + along) / edge_length).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Some(EdgeSnap {
            edge: entry.data.edge,
            point: closest,
            distance,
            fraction,
        })
    }

    /// Bounding box of all edge geometries
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.graph
            .edge_weights()
            .filter_map(|edge| edge.geometry.bounding_rect())
            .reduce(|acc, rect| {
                Rect::new(
                    (acc.min().x.min(rect.min().x), acc.min().y.min(rect.min().y)),
                    (acc.max().x.max(rect.max().x), acc.max().y.max(rect.max().y)),
                )
            })
    }
}

fn node_for(
    graph: &mut UnGraph<GraphNode, WeightedEdge>,
    lookup: &mut HashMap<(u64, u64), NodeIndex>,
    point: Point<f64>,
) -> NodeIndex {
    // +0.0 folds -0.0 into 0.0 so both hash alike
    let key = ((point.x() + 0.0).to_bits(), (point.y() + 0.0).to_bits());
    *lookup
        .entry(key)
        .or_insert_with(|| graph.add_node(GraphNode { geometry: point }))
}

#[cfg(test)]
mod tests {
    use geo::{Euclidean, Length, LineString, line_string};

    use super::*;

    fn edge(id: u64, geometry: LineString<f64>) -> WeightedEdge {
        let length = Euclidean.length(&geometry);
        WeightedEdge {
            source_id: id,
            geometry,
            length,
            delta_h: 0.0,
            cost: length,
            effective_speed: 4.0,
        }
    }

    #[test]
    fn shared_endpoints_are_one_node() {
        let graph = WeightedGraph::from_edges(vec![
            edge(1, line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]),
            edge(2, line_string![(x: 100.0, y: 0.0), (x: 100.0, y: 100.0)]),
            edge(3, line_string![(x: 0.0, y: 0.0), (x: 0.0, y: -50.0)]),
        ]);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn snaps_to_closest_segment() {
        let graph = WeightedGraph::from_edges(vec![edge(
            1,
            line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 100.0)],
        )]);
        let snap = graph.nearest_edge(Point::new(130.0, 50.0)).unwrap();
        assert!((snap.distance - 30.0).abs() < 1e-9);
        assert!((snap.fraction - 0.75).abs() < 1e-9);
        assert!((snap.point.x() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_graph_has_no_snap() {
        let graph = WeightedGraph::from_edges(Vec::new());
        assert!(graph.is_empty());
        assert!(graph.nearest_edge(Point::new(0.0, 0.0)).is_none());
        assert!(graph.bounding_rect().is_none());
    }
}
