//! Data model for terrain-weighted accessibility
//!
//! Contains the network edges as loaded, the weighted graph derived from
//! them, travel budgets and modes, population samples and the isochrone
//! values produced by a run.

pub mod budget;
pub mod isochrone;
pub mod mode;
pub mod network;
pub mod population;

pub use budget::TravelBudget;
pub use isochrone::{IsochronePolygon, IsochroneRecord, StartPointRecord};
pub use mode::TravelMode;
pub use network::{EdgeSnap, GraphNode, NetworkEdge, WeightedEdge, WeightedGraph};
pub use population::{PopulationLayer, PopulationSample};
