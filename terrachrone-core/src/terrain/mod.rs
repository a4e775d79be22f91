//! Elevation surfaces and draping of network edges
//!
//! The surface itself is an external collaborator behind
//! [`ElevationSurface`]; [`ContourSurface`] is the default built from
//! contour vertices.

mod contour;

pub use contour::{ContourLine, ContourSurface, SurfaceBuilder};

use geo::{LineString, Point};

use crate::model::NetworkEdge;

/// Continuous height field queried by point
pub trait ElevationSurface: Send + Sync {
    /// Elevation at `point`, `None` where the surface has no data
    fn sample(&self, point: Point<f64>) -> Option<f64>;

    /// Whether the surface was built successfully and can be sampled
    fn is_valid(&self) -> bool {
        true
    }
}

/// Per-vertex elevation of a polyline; NODATA vertices are `None`
pub fn sample_line(surface: &dyn ElevationSurface, line: &LineString<f64>) -> Vec<Option<f64>> {
    line.points().map(|point| surface.sample(point)).collect()
}

/// Copy of `edge` whose Z ordinates come from the surface
///
/// NODATA vertices become NaN, which makes the edge's elevation delta
/// fall back to zero. The planar geometry is untouched.
pub fn drape(surface: &dyn ElevationSurface, edge: &NetworkEdge) -> NetworkEdge {
    let vertex_z = sample_line(surface, &edge.geometry)
        .into_iter()
        .map(|z| z.unwrap_or(f64::NAN))
        .collect();
    edge.clone().with_vertex_z(vertex_z)
}

/// Elevation difference used for the slope penalty
///
/// A declared manual value wins when it is positive; otherwise the
/// difference between the end vertices' Z, or zero when unknown.
pub fn elevation_delta(edge: &NetworkEdge) -> f64 {
    match edge.manual_elevation {
        Some(manual) if manual > 0.0 && manual.is_finite() => manual,
        _ => edge.z_delta().unwrap_or(0.0),
    }
}
