use geo::Geometry;
use log::{info, warn};

use super::LoadedLayer;
use super::config::NetworkConfig;
use super::features::{feature_id, legacy_crs, line_z, number_property, planar_geometry, read_feature_collection};
use crate::Error;
use crate::model::NetworkEdge;

/// Read network edges
///
/// Every part of a `MultiLineString` becomes its own edge sharing the
/// feature's id. Z ordinates are kept when every vertex of a part has one.
/// Non-line features are skipped.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or when a geometry cannot
/// be converted.
pub fn load_network(config: &NetworkConfig) -> Result<LoadedLayer<NetworkEdge>, Error> {
    let collection = read_feature_collection(&config.path)?;
    let crs = config.crs.clone().or_else(|| legacy_crs(&collection));

    let mut edges = Vec::with_capacity(collection.features.len());
    let mut skipped = 0;
    for (position, feature) in collection.features.iter().enumerate() {
        let id = feature_id(feature, config.id_field.as_deref(), position as u64 + 1);
        let manual = config
            .manual_elevation_field
            .as_deref()
            .and_then(|name| number_property(feature, name));
        let speed = config
            .speed_field
            .as_deref()
            .and_then(|name| number_property(feature, name));

        let lines = match planar_geometry(feature)? {
            Some(Geometry::LineString(line)) => vec![line],
            Some(Geometry::MultiLineString(lines)) => lines.0,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let mut z = line_z(feature).into_iter();
        for line in lines {
            let mut edge = NetworkEdge::new(id, line)
                .with_manual_elevation(manual)
                .with_declared_speed(speed);
            if let Some(Some(vertex_z)) = z.next() {
                edge = edge.with_vertex_z(vertex_z);
            }
            edges.push(edge);
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} network features without line geometry");
    }
    info!("Loaded {} network edges from {}", edges.len(), config.path.display());
    Ok(LoadedLayer {
        features: edges,
        crs,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_edges_with_fields_and_z() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "type": "FeatureCollection",
                "crs": {{"type": "name", "properties": {{"name": "EPSG:32637"}}}},
                "features": [
                    {{"type": "Feature", "properties": {{"fid": 10, "dh": "2,5", "v": 5}},
                      "geometry": {{"type": "LineString", "coordinates": [[0, 0, 100], [50, 0, 104]]}}}},
                    {{"type": "Feature", "properties": {{"fid": 11}},
                      "geometry": {{"type": "MultiLineString",
                                    "coordinates": [[[50, 0], [100, 0]], [[100, 0], [100, 50]]]}}}},
                    {{"type": "Feature", "properties": {{}},
                      "geometry": {{"type": "Point", "coordinates": [1, 1]}}}}
                ]
            }}"#
        )
        .unwrap();

        let config = NetworkConfig {
            id_field: Some("fid".to_string()),
            manual_elevation_field: Some("dh".to_string()),
            speed_field: Some("v".to_string()),
            ..NetworkConfig::new(file.path())
        };
        let layer = load_network(&config).unwrap();

        assert_eq!(layer.features.len(), 3);
        assert_eq!(layer.skipped, 1);
        assert_eq!(layer.crs.as_deref(), Some("EPSG:32637"));

        let first = &layer.features[0];
        assert_eq!(first.id, 10);
        assert_eq!(first.vertex_z, Some(vec![100.0, 104.0]));
        assert_eq!(first.manual_elevation, Some(2.5));
        assert_eq!(first.declared_speed, Some(5.0));

        assert!(layer.features[1..].iter().all(|e| e.id == 11 && e.vertex_z.is_none()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_network(&NetworkConfig::new("/nonexistent/roads.geojson"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
