use std::path::Path;

use geo::{Geometry, Point};
use log::info;

use super::LoadedLayer;
use super::features::{legacy_crs, planar_geometry, read_feature_collection};
use crate::Error;

/// Read origin points; `MultiPoint` members count as separate origins
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or holds no point at all.
pub fn load_origins(path: &Path) -> Result<LoadedLayer<Point<f64>>, Error> {
    let collection = read_feature_collection(path)?;
    let crs = legacy_crs(&collection);

    let mut points = Vec::new();
    let mut skipped = 0;
    for feature in &collection.features {
        match planar_geometry(feature)? {
            Some(Geometry::Point(point)) => points.push(point),
            Some(Geometry::MultiPoint(multi)) => points.extend(multi.0),
            _ => skipped += 1,
        }
    }

    if points.is_empty() {
        return Err(Error::MissingLayer(format!(
            "{} contains no origin points",
            path.display()
        )));
    }
    info!("Loaded {} origin points from {}", points.len(), path.display());
    Ok(LoadedLayer {
        features: points,
        crs,
        skipped,
    })
}
