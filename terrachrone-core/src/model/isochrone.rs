//! Values produced by a run

use geo::{Area, MultiPolygon, Point};
use serde::Serialize;

/// Dissolved reachable region for one (origin, budget) pair
#[derive(Debug, Clone)]
pub struct IsochronePolygon {
    pub geometry: MultiPolygon<f64>,
    pub area_km2: f64,
}

impl IsochronePolygon {
    /// Wraps a geometry, computing its area in km² from square metres
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        let area_km2 = geometry.unsigned_area() / 1_000_000.0;
        Self { geometry, area_km2 }
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }
}

/// Attribute row of an isochrone output feature
#[derive(Debug, Clone, Serialize)]
pub struct IsochroneRecord {
    pub id: i64,
    pub t_min: f64,
    pub mode: String,
    pub area_km2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop_sum: Option<f64>,
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

impl IsochroneRecord {
    pub fn new(id: i64, t_min: f64, mode: &str, polygon: IsochronePolygon) -> Self {
        Self {
            id,
            t_min,
            mode: mode.to_string(),
            area_km2: polygon.area_km2,
            pop_sum: None,
            geometry: polygon.geometry,
        }
    }

    #[must_use]
    pub fn with_population(mut self, pop_sum: Option<f64>) -> Self {
        self.pop_sum = pop_sum;
        self
    }
}

/// Attribute row of the start point output feature
#[derive(Debug, Clone, Serialize)]
pub struct StartPointRecord {
    pub id: i64,
    pub mode: String,
    #[serde(skip)]
    pub geometry: Point<f64>,
}
