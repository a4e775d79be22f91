use geo::{BoundingRect, Intersects};

use crate::model::{IsochronePolygon, PopulationLayer};

/// Total weight of samples touching the polygon
///
/// A sample counts with its full weight as soon as it intersects the
/// polygon, boundary contact included. Overlap is not apportioned.
pub fn population_sum(layer: &PopulationLayer, polygon: &IsochronePolygon) -> f64 {
    let Some(rect) = polygon.geometry.bounding_rect() else {
        return 0.0;
    };
    layer
        .candidates(rect)
        .filter(|sample| sample.geometry.intersects(&polygon.geometry))
        .map(|sample| sample.weight)
        .sum()
}
