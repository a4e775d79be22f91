//! Road network model

pub mod components;
pub mod graph;

pub use components::{GraphNode, NetworkEdge, WeightedEdge};
pub use graph::{EdgeSnap, WeightedGraph};
