use geo::Geometry;
use log::{info, warn};

use super::LoadedLayer;
use super::config::TerrainConfig;
use super::features::{legacy_crs, line_z, number_property, planar_geometry, read_feature_collection};
use crate::Error;
use crate::terrain::ContourLine;

/// Read contour curves with their elevation
///
/// The elevation comes from `elevation_field` when configured, otherwise
/// from Z ordinates. Curves with neither are skipped.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed.
pub fn load_contours(config: &TerrainConfig) -> Result<LoadedLayer<ContourLine>, Error> {
    let collection = read_feature_collection(&config.contours)?;
    let crs = config.crs.clone().or_else(|| legacy_crs(&collection));

    let mut contours = Vec::new();
    let mut skipped = 0;
    for feature in &collection.features {
        let lines = match planar_geometry(feature)? {
            Some(Geometry::LineString(line)) => vec![line],
            Some(Geometry::MultiLineString(lines)) => lines.0,
            _ => {
                skipped += 1;
                continue;
            }
        };

        match config.elevation_field.as_deref() {
            Some(field) => {
                let Some(elevation) = number_property(feature, field) else {
                    skipped += 1;
                    continue;
                };
                contours.extend(lines.into_iter().map(|geometry| ContourLine {
                    geometry,
                    elevation: Some(elevation),
                    vertex_z: None,
                }));
            }
            None => {
                for (geometry, vertex_z) in lines.into_iter().zip(line_z(feature)) {
                    match vertex_z {
                        Some(vertex_z) => contours.push(ContourLine {
                            geometry,
                            elevation: None,
                            vertex_z: Some(vertex_z),
                        }),
                        None => skipped += 1,
                    }
                }
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} contour features without usable elevation");
    }
    info!("Loaded {} contour lines from {}", contours.len(), config.contours.display());
    Ok(LoadedLayer {
        features: contours,
        crs,
        skipped,
    })
}
