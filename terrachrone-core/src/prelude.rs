//! Commonly used items for running accessibility analyses

pub use crate::Error;
pub use crate::Minutes;

// Data model
pub use crate::model::{
    IsochronePolygon, IsochroneRecord, NetworkEdge, PopulationLayer, PopulationSample,
    StartPointRecord, TravelBudget, TravelMode, WeightedEdge, WeightedGraph,
};

// Terrain and cost
pub use crate::cost::{EdgeCostModel, WeightingProfile};
pub use crate::terrain::{ContourLine, ContourSurface, ElevationSurface, SurfaceBuilder};

// Reachability and polygons
pub use crate::algo::{intersect, population_sum, synthesize};
pub use crate::routing::{DijkstraServiceArea, ReachabilityEngine, ReachableSubnetwork, TravelStrategy};

// Runs
pub use crate::loading::{
    NetworkConfig, PopulationConfig, TerrainConfig, build_network, load_origins, load_population,
};
pub use crate::output::{FeatureSink, GeoJsonSink, MemorySink};
pub use crate::pipeline::{
    CancellationToken, Diagnostic, DualOriginRequest, Feedback, LogFeedback, MultiThresholdRequest,
    run_dual_origin, run_multi_threshold,
};
