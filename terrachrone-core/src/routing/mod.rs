//! Reachability over the weighted graph
//!
//! [`ReachabilityEngine`] is the seam between the orchestrator and the
//! shortest-path search; [`DijkstraServiceArea`] is the default engine.

mod dijkstra;
mod service_area;
mod substring;

pub use service_area::DijkstraServiceArea;
pub(crate) use substring::line_substring;

use geo::{Euclidean, Length, MultiLineString, Point};

use crate::Error;
use crate::model::WeightedGraph;

/// How edge weights and budgets are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelStrategy {
    /// Edge weight is `cost`, budget is a cost-unit ceiling
    Distance,
    /// Edge weight is traversal seconds at the effective speed, budget is minutes
    Time,
}

impl TravelStrategy {
    /// Budget converted to the unit of edge weights
    pub fn ceiling(self, budget: f64) -> f64 {
        match self {
            Self::Distance => budget,
            Self::Time => budget * 60.0,
        }
    }
}

/// How much of an edge lies within the budget
#[derive(Debug, Clone, PartialEq)]
pub enum Coverage {
    Full,
    /// Covered fraction intervals along the edge, sorted and disjoint
    Partial(Vec<(f64, f64)>),
}

impl Coverage {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// One edge (or part of one) inside the reachable sub-network
#[derive(Debug, Clone)]
pub struct ReachedEdge {
    /// Id of the network edge this was cut from
    pub source_id: u64,
    pub coverage: Coverage,
    pub geometry: MultiLineString<f64>,
}

/// Edges reachable within one budget from one origin set
#[derive(Debug, Clone, Default)]
pub struct ReachableSubnetwork {
    pub edges: Vec<ReachedEdge>,
}

impl ReachableSubnetwork {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn geometries(&self) -> impl Iterator<Item = &MultiLineString<f64>> {
        self.edges.iter().map(|edge| &edge.geometry)
    }

    /// Total network length covered, in layer units
    pub fn covered_length(&self) -> f64 {
        self.geometries().map(|g| Euclidean.length(g)).sum()
    }

    pub fn contains_edge(&self, source_id: u64) -> bool {
        self.edges.iter().any(|edge| edge.source_id == source_id)
    }
}

/// Computes the part of the network within a budget of any origin
pub trait ReachabilityEngine: Sync {
    /// An unreachable budget is an empty sub-network, not an error.
    ///
    /// # Errors
    ///
    /// Fails when the graph has no edges to snap the origins onto, or when
    /// the underlying search fails.
    fn reachable(
        &self,
        graph: &WeightedGraph,
        origins: &[Point<f64>],
        budget: f64,
        strategy: TravelStrategy,
    ) -> Result<ReachableSubnetwork, Error>;
}
