use geo::{Coord, LineString, Point, Rect};
use log::{debug, info};
use rstar::{PointDistance, RTree, primitives::GeomWithData};

use super::ElevationSurface;
use crate::Error;

/// Contour curve with either a single elevation or per-vertex Z
#[derive(Debug, Clone)]
pub struct ContourLine {
    pub geometry: LineString<f64>,
    /// Elevation attribute of the whole curve
    pub elevation: Option<f64>,
    /// Z ordinates when the curve was read as 3D
    pub vertex_z: Option<Vec<f64>>,
}

impl ContourLine {
    fn vertices(&self) -> impl Iterator<Item = (Coord<f64>, f64)> + '_ {
        self.geometry
            .0
            .iter()
            .enumerate()
            .filter_map(move |(i, coord)| {
                let z = match (&self.vertex_z, self.elevation) {
                    (_, Some(elevation)) => Some(elevation),
                    (Some(zs), None) => zs.get(i).copied(),
                    (None, None) => None,
                };
                z.filter(|z| z.is_finite() && coord.x.is_finite() && coord.y.is_finite())
                    .map(|z| (*coord, z))
            })
    }
}

type ElevationVertex = GeomWithData<[f64; 2], f64>;

/// Inverse-distance weighted surface over contour vertices
///
/// Samples outside the build extent are NODATA.
#[derive(Debug)]
pub struct ContourSurface {
    vertices: RTree<ElevationVertex>,
    extent: Rect<f64>,
    neighbours: usize,
    power: f64,
}

impl ElevationSurface for ContourSurface {
    fn sample(&self, point: Point<f64>) -> Option<f64> {
        if !covers(&self.extent, point) {
            return None;
        }
        let query = [point.x(), point.y()];

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for vertex in self.vertices.nearest_neighbor_iter(&query).take(self.neighbours) {
            let distance = vertex.distance_2(&query).sqrt();
            if distance < 1e-9 {
                return Some(vertex.data);
            }
            let weight = distance.powf(-self.power);
            weighted_sum += weight * vertex.data;
            weight_total += weight;
        }

        (weight_total > 0.0).then(|| weighted_sum / weight_total)
    }

    fn is_valid(&self) -> bool {
        self.vertices.size() >= 3
    }
}

/// Closed-box test, boundary included
fn covers(extent: &Rect<f64>, point: Point<f64>) -> bool {
    (extent.min().x..=extent.max().x).contains(&point.x())
        && (extent.min().y..=extent.max().y).contains(&point.y())
}

/// Builds a [`ContourSurface`]
#[derive(Debug, Clone)]
pub struct SurfaceBuilder {
    neighbours: usize,
    power: f64,
}

impl Default for SurfaceBuilder {
    fn default() -> Self {
        Self {
            neighbours: 8,
            power: 2.0,
        }
    }
}

impl SurfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn neighbours(mut self, neighbours: usize) -> Self {
        self.neighbours = neighbours.max(1);
        self
    }

    #[must_use]
    pub fn power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Build the surface over `extent`
    ///
    /// # Errors
    ///
    /// Fails when the extent is degenerate or fewer than three contour
    /// vertices carry a usable elevation.
    pub fn build(&self, contours: &[ContourLine], extent: Rect<f64>) -> Result<ContourSurface, Error> {
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(Error::SurfaceBuild(format!(
                "extent {:?} - {:?} has no area",
                extent.min(),
                extent.max()
            )));
        }

        let vertices: Vec<ElevationVertex> = contours
            .iter()
            .flat_map(ContourLine::vertices)
            .map(|(coord, z)| GeomWithData::new([coord.x, coord.y], z))
            .collect();

        if vertices.len() < 3 {
            return Err(Error::SurfaceBuild(format!(
                "need at least 3 contour vertices with elevation, found {}",
                vertices.len()
            )));
        }

        debug!(
            "Building contour surface from {} vertices (k = {}, power = {})",
            vertices.len(),
            self.neighbours,
            self.power
        );
        let surface = ContourSurface {
            vertices: RTree::bulk_load(vertices),
            extent,
            neighbours: self.neighbours,
            power: self.power,
        };
        info!("Elevation surface built from {} contour vertices", surface.vertices.size());
        Ok(surface)
    }
}
