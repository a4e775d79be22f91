use std::path::PathBuf;

use serde::Deserialize;

/// Road network layer
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// GeoJSON file with `LineString` / `MultiLineString` features
    pub path: PathBuf,
    /// Numeric property used as edge id, feature id or position otherwise
    #[serde(default)]
    pub id_field: Option<String>,
    /// Property with a declared elevation difference per edge
    #[serde(default)]
    pub manual_elevation_field: Option<String>,
    /// Property with a declared speed (km/h) per edge
    #[serde(default)]
    pub speed_field: Option<String>,
    #[serde(default)]
    pub crs: Option<String>,
}

impl NetworkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            id_field: None,
            manual_elevation_field: None,
            speed_field: None,
            crs: None,
        }
    }
}

/// Contour layer the elevation surface is built from
#[derive(Debug, Clone, Deserialize)]
pub struct TerrainConfig {
    pub contours: PathBuf,
    /// Elevation property; the Z ordinate is used when absent
    #[serde(default)]
    pub elevation_field: Option<String>,
    #[serde(default = "default_neighbours")]
    pub neighbours: usize,
    #[serde(default = "default_power")]
    pub power: f64,
    #[serde(default)]
    pub crs: Option<String>,
}

fn default_neighbours() -> usize {
    8
}

fn default_power() -> f64 {
    2.0
}

/// Population samples, GeoJSON features or CSV points
#[derive(Debug, Clone, Deserialize)]
pub struct PopulationConfig {
    pub path: PathBuf,
    pub weight_field: String,
    /// CSV column with the x coordinate
    #[serde(default = "default_x_field")]
    pub x_field: String,
    /// CSV column with the y coordinate
    #[serde(default = "default_y_field")]
    pub y_field: String,
    #[serde(default)]
    pub crs: Option<String>,
}

fn default_x_field() -> String {
    "x".to_string()
}

fn default_y_field() -> String {
    "y".to_string()
}
