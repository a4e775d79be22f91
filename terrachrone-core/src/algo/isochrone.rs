//! Isochrone polygons from reachable sub-networks
//!
//! Every reached edge is buffered, the buffers are dissolved into one
//! region and the region is repaired. Disjoint parts stay separate members
//! of a single multipolygon.

use geo::{Area, BooleanOps, Buffer, MultiPolygon, Polygon, Validation, unary_union};
use log::{debug, trace};
use rayon::prelude::*;

use crate::Error;
use crate::model::IsochronePolygon;
use crate::routing::ReachableSubnetwork;

/// Rings smaller than this (in squared layer units) are union slivers
const SLIVER_AREA: f64 = 1e-6;

/// Buffer, dissolve and repair a sub-network
///
/// An empty sub-network yields `Ok(None)`.
///
/// # Errors
///
/// Fails for a non-positive or non-finite buffer distance.
pub fn synthesize(
    subnetwork: &ReachableSubnetwork,
    buffer_distance: f64,
) -> Result<Option<IsochronePolygon>, Error> {
    if !(buffer_distance.is_finite() && buffer_distance > 0.0) {
        return Err(Error::IsochroneError(format!(
            "buffer distance must be positive, got {buffer_distance}"
        )));
    }
    if subnetwork.is_empty() {
        return Ok(None);
    }

    let buffers: Vec<Polygon<f64>> = subnetwork
        .edges
        .par_iter()
        .flat_map_iter(|edge| edge.geometry.buffer(buffer_distance).0)
        .collect();
    trace!("Dissolving {} edge buffers", buffers.len());

    let region = repair(unary_union(&buffers));
    if region.0.is_empty() {
        return Ok(None);
    }
    debug!(
        "Isochrone of {} edges has {} part(s)",
        subnetwork.len(),
        region.0.len()
    );
    Ok(Some(IsochronePolygon::new(region)))
}

/// Drop sliver rings and re-dissolve when the region is still invalid
pub fn repair(region: MultiPolygon<f64>) -> MultiPolygon<f64> {
    let cleaned = MultiPolygon::new(
        region
            .0
            .into_iter()
            .filter(|polygon| polygon.exterior().0.len() >= 4)
            .map(drop_slivers)
            .filter(|polygon| polygon.unsigned_area() > SLIVER_AREA)
            .collect(),
    );

    if cleaned.is_valid() {
        cleaned
    } else {
        debug!("Union produced an invalid region, re-dissolving");
        unary_union(&cleaned.0)
    }
}

fn drop_slivers(polygon: Polygon<f64>) -> Polygon<f64> {
    let (exterior, interiors) = polygon.into_inner();
    let interiors = interiors
        .into_iter()
        .filter(|ring| ring.0.len() >= 4 && Polygon::new(ring.clone(), vec![]).unsigned_area() > SLIVER_AREA)
        .collect();
    Polygon::new(exterior, interiors)
}

/// Region reachable from both polygons; empty when they are disjoint
pub fn intersect(a: &IsochronePolygon, b: &IsochronePolygon) -> IsochronePolygon {
    IsochronePolygon::new(repair(a.geometry.intersection(&b.geometry)))
}
