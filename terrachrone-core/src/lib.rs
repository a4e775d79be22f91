//! Terrain-weighted network accessibility.
//!
//! Builds travel-time isochrones over a road network where climbing costs
//! more than flat travel, and aggregates reachable area and population.
//!
//! The crate is organised as a pipeline of value-passing stages:
//!
//! 1. [`loading`] reads network edges, contours, origins and population;
//! 2. [`terrain`] drapes edges over an [`ElevationSurface`];
//! 3. [`cost`] turns geometry and elevation into per-edge cost and speed,
//!    producing a [`WeightedGraph`];
//! 4. [`routing`] computes the reachable sub-network for a budget;
//! 5. [`algo`] synthesizes isochrone polygons and sums population;
//! 6. [`pipeline`] drives the dual-origin and multi-threshold runs;
//! 7. [`output`] persists records through a [`FeatureSink`].

pub mod algo;
pub mod cost;
mod error;
pub mod loading;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prelude;
pub mod routing;
pub mod terrain;

pub use error::Error;

pub use cost::{EdgeCostModel, WeightingProfile};
pub use model::{
    IsochronePolygon, IsochroneRecord, NetworkEdge, PopulationLayer, PopulationSample,
    StartPointRecord, TravelBudget, TravelMode, WeightedGraph,
};
pub use output::FeatureSink;
pub use routing::{DijkstraServiceArea, ReachabilityEngine, ReachableSubnetwork, TravelStrategy};
pub use terrain::{ContourSurface, ElevationSurface};

/// Travel time in minutes
pub type Minutes = f64;

/// Penalty weight `k` applied per elevation unit climbed or descended
pub const SLOPE_PENALTY: f64 = 5.0;

/// Guards the effective speed division for edges whose cost is zero
pub const SPEED_EPSILON: f64 = 0.001;

/// Reference speed (km/h) under which one cost unit takes one second
pub const COST_EQUIVALENT_SPEED_KMH: f64 = 3.6;

/// Walking speed (km/h) used to reach the network from an off-network origin
pub const ACCESS_WALK_SPEED_KMH: f64 = 4.0;
