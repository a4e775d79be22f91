use geo::{BoundingRect, ConvexHull, Intersects, MultiPoint, Point, Rect};
use log::info;

use super::config::{NetworkConfig, TerrainConfig};
use super::contours::load_contours;
use super::crs::crs_mismatch;
use super::network::load_network;
use crate::model::NetworkEdge;
use crate::pipeline::{Diagnostic, Feedback, PreparedNetwork, emit, prepare_network};
use crate::terrain::{ContourLine, ElevationSurface, SurfaceBuilder};
use crate::{Error, WeightedGraph, WeightingProfile};

/// Load the network, build the elevation surface when contours are given
/// and the profile uses elevation, and weigh the graph
///
/// Contours are read and the network is parsed concurrently.
///
/// # Errors
///
/// Returns an error if an input is missing or unreadable, or when the
/// elevation surface cannot be built.
pub fn build_network(
    network: &NetworkConfig,
    terrain: Option<&TerrainConfig>,
    profile: WeightingProfile,
    feedback: &dyn Feedback,
) -> Result<PreparedNetwork, Error> {
    let ignored_terrain = terrain.is_some() && !profile.uses_elevation();
    let terrain = terrain.filter(|_| profile.uses_elevation());
    validate_config(network, terrain)?;
    info!("Processing network data: {}", network.path.display());

    let (edges, contours) = rayon::join(
        || load_network(network),
        || terrain.map(load_contours).transpose(),
    );
    let edges = edges?;
    let contours = contours?;

    let mut diagnostics = Vec::new();
    if ignored_terrain {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::info("Contours ignored, the travel mode does not use elevation"),
        );
    }
    if edges.skipped > 0 {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::warning(format!("{} network features are not lines and were skipped", edges.skipped)),
        );
    }

    let surface = match (terrain, contours) {
        (Some(terrain), Some(contours)) => {
            if let Some(message) = crs_mismatch("Contour", edges.crs.as_deref(), contours.crs.as_deref()) {
                emit(feedback, &mut diagnostics, Diagnostic::warning(message));
            }
            let extent = surface_extent(&edges.features, &contours.features).ok_or_else(|| {
                Error::SurfaceBuild("network and contours have no extent".to_string())
            })?;
            let surface = SurfaceBuilder::new()
                .neighbours(terrain.neighbours)
                .power(terrain.power)
                .build(&contours.features, extent)?;
            Some(surface)
        }
        _ => None,
    };

    let crs = edges.crs;
    let mut prepared = prepare_network(
        edges.features,
        surface.as_ref().map(|s| s as &dyn ElevationSurface),
        profile,
        feedback,
    )?;
    diagnostics.append(&mut prepared.diagnostics);
    prepared.diagnostics = diagnostics;
    prepared.crs = crs;

    info!("Network model created successfully");
    Ok(prepared)
}

fn validate_config(network: &NetworkConfig, terrain: Option<&TerrainConfig>) -> Result<(), Error> {
    if !network.path.exists() {
        return Err(Error::MissingLayer(format!(
            "network file not found: {}",
            network.path.display()
        )));
    }
    if let Some(terrain) = terrain {
        if !terrain.contours.exists() {
            return Err(Error::MissingLayer(format!(
                "contour file not found: {}",
                terrain.contours.display()
            )));
        }
        if terrain.neighbours == 0 || !(terrain.power.is_finite() && terrain.power > 0.0) {
            return Err(Error::InvalidData(
                "contour interpolation needs at least one neighbour and a positive power".to_string(),
            ));
        }
    }
    Ok(())
}

/// Union of network and contour bounding boxes
fn surface_extent(edges: &[NetworkEdge], contours: &[ContourLine]) -> Option<Rect<f64>> {
    edges
        .iter()
        .filter_map(|edge| edge.geometry.bounding_rect())
        .chain(contours.iter().filter_map(|c| c.geometry.bounding_rect()))
        .reduce(|acc, rect| {
            Rect::new(
                (acc.min().x.min(rect.min().x), acc.min().y.min(rect.min().y)),
                (acc.max().x.max(rect.max().x), acc.max().y.max(rect.max().y)),
            )
        })
}

/// Warning for origins outside the convex hull of the network nodes
#[allow(clippy::cast_precision_loss)]
pub fn check_origin_coverage(graph: &WeightedGraph, origins: &[Point<f64>]) -> Option<Diagnostic> {
    let nodes: MultiPoint = graph.graph.node_weights().map(|node| node.geometry).collect();
    let hull = nodes.convex_hull();

    let outside = origins.iter().filter(|origin| !origin.intersects(&hull)).count();
    if outside == 0 {
        return None;
    }
    let percentage = (outside as f64 / origins.len() as f64) * 100.0;
    Some(Diagnostic::warning(format!(
        "{outside} of {} origins ({percentage:.1}%) are outside the network coverage area; \
        they reach the network through a long access walk",
        origins.len()
    )))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use geo::line_string;

    use super::*;
    use crate::model::{TravelMode, WeightedEdge};
    use crate::pipeline::testing::RecordingFeedback;

    fn geojson_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn builds_a_draped_graph() {
        let network = geojson_file(
            r#"{"type": "FeatureCollection", "crs": {"type": "name", "properties": {"name": "EPSG:32637"}},
                "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [0, 100]]}}
            ]}"#,
        );
        let contours = geojson_file(
            r#"{"type": "FeatureCollection", "crs": {"type": "name", "properties": {"name": "EPSG:4326"}},
                "features": [
                {"type": "Feature", "properties": {"h": 10},
                 "geometry": {"type": "LineString", "coordinates": [[-50, 0], [0, 0], [50, 0]]}},
                {"type": "Feature", "properties": {"h": 30},
                 "geometry": {"type": "LineString", "coordinates": [[-50, 100], [0, 100], [50, 100]]}}
            ]}"#,
        );
        let terrain = TerrainConfig {
            contours: contours.path().to_path_buf(),
            elevation_field: Some("h".to_string()),
            neighbours: 8,
            power: 2.0,
            crs: None,
        };

        let prepared = build_network(
            &NetworkConfig::new(network.path()),
            Some(&terrain),
            WeightingProfile::CostEquivalent,
            &RecordingFeedback::default(),
        )
        .unwrap();

        let edge = prepared.graph.edges().next().unwrap();
        assert!((edge.delta_h - 20.0).abs() < 1e-9);
        assert!((edge.cost - 200.0).abs() < 1e-9);
        assert_eq!(prepared.crs.as_deref(), Some("EPSG:32637"));
        // contour layer declares a different CRS
        assert!(prepared.diagnostics.iter().any(|d| d.message.contains("EPSG:4326")));
    }

    #[test]
    fn missing_contours_are_fatal() {
        let network = geojson_file(r#"{"type": "FeatureCollection", "features": []}"#);
        let terrain = TerrainConfig {
            contours: "/nonexistent/contours.geojson".into(),
            elevation_field: None,
            neighbours: 8,
            power: 2.0,
            crs: None,
        };
        let result = build_network(
            &NetworkConfig::new(network.path()),
            Some(&terrain),
            WeightingProfile::CostEquivalent,
            &RecordingFeedback::default(),
        );
        assert!(matches!(result, Err(Error::MissingLayer(_))));
    }

    #[test]
    fn flat_modes_skip_the_terrain() {
        let network = geojson_file(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [0, 100]]}}
            ]}"#,
        );
        let terrain = TerrainConfig {
            contours: "/nonexistent/contours.geojson".into(),
            elevation_field: None,
            neighbours: 8,
            power: 2.0,
            crs: None,
        };

        let prepared = build_network(
            &NetworkConfig::new(network.path()),
            Some(&terrain),
            WeightingProfile::Mode(TravelMode::Cycle),
            &RecordingFeedback::default(),
        )
        .unwrap();

        let edge = prepared.graph.edges().next().unwrap();
        assert_eq!(edge.delta_h, 0.0);
        assert!(prepared.diagnostics.iter().any(|d| d.message.starts_with("Contours ignored")));

        let sloped = build_network(
            &NetworkConfig::new(network.path()),
            Some(&terrain),
            WeightingProfile::Mode(TravelMode::Pedestrian { with_slope: true }),
            &RecordingFeedback::default(),
        );
        assert!(matches!(sloped, Err(Error::MissingLayer(_))));
    }

    #[test]
    fn far_origins_are_reported() {
        let edge = |source_id, geometry| WeightedEdge {
            source_id,
            geometry,
            length: 100.0,
            delta_h: 0.0,
            cost: 100.0,
            effective_speed: 3.6,
        };
        let graph = WeightedGraph::from_edges(vec![
            edge(1, line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]),
            edge(2, line_string![(x: 100.0, y: 0.0), (x: 100.0, y: 100.0)]),
        ]);
        assert!(check_origin_coverage(&graph, &[Point::new(60.0, 20.0)]).is_none());
        let warning = check_origin_coverage(&graph, &[Point::new(60.0, 20.0), Point::new(5000.0, 0.0)]).unwrap();
        assert!(warning.message.starts_with("1 of 2 origins (50.0%)"));
    }
}
