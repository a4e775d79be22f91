//! This module is responsible for reading the input layers (GeoJSON, CSV)
//! and building the weighted network a run works on.

mod builder;
mod config;
mod contours;
mod crs;
mod features;
mod network;
mod origins;
mod population;

pub use builder::{build_network, check_origin_coverage};
pub use config::{NetworkConfig, PopulationConfig, TerrainConfig};
pub use contours::load_contours;
pub use crs::{crs_mismatch, looks_geographic};
pub use features::parse_decimal;
pub use network::load_network;
pub use origins::load_origins;
pub use population::load_population;

/// Features read from one input layer
#[derive(Debug, Clone)]
pub struct LoadedLayer<T> {
    pub features: Vec<T>,
    /// Declared coordinate reference system, if any
    pub crs: Option<String>,
    /// Features that could not be used
    pub skipped: usize,
}
