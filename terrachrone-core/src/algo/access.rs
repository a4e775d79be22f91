use geo::Point;

use crate::model::WeightedGraph;
use crate::{ACCESS_WALK_SPEED_KMH, Error, Minutes};

/// Walk from an origin to the nearest point of the network
#[derive(Debug, Clone, Copy)]
pub struct AccessLeg {
    /// Where the walk joins the network
    pub entry: Point<f64>,
    /// Straight-line distance in layer units (metres)
    pub distance: f64,
    pub minutes: Minutes,
}

/// Minutes needed to walk `distance` metres at the access speed
pub fn access_minutes(distance: f64) -> Minutes {
    distance / 1000.0 / ACCESS_WALK_SPEED_KMH * 60.0
}

/// # Errors
///
/// Fails with [`Error::NoEdgesFound`] on an empty network and with
/// [`Error::UnresolvableOrigin`] for non-finite coordinates.
pub fn access_leg(graph: &WeightedGraph, origin: Point<f64>) -> Result<AccessLeg, Error> {
    if !(origin.x().is_finite() && origin.y().is_finite()) {
        return Err(Error::UnresolvableOrigin(format!("{origin:?}")));
    }
    let snap = graph.nearest_edge(origin).ok_or(Error::NoEdgesFound)?;
    Ok(AccessLeg {
        entry: snap.point,
        distance: snap.distance,
        minutes: access_minutes(snap.distance),
    })
}
