use geo::{Coord, LineString};
use log::info;
use rayon::prelude::*;

use super::{Diagnostic, Feedback, emit};
use crate::cost::{EdgeCostModel, WeightingProfile};
use crate::loading::looks_geographic;
use crate::model::{NetworkEdge, WeightedGraph};
use crate::terrain::{ElevationSurface, drape};
use crate::Error;

/// Network ready for reachability queries
#[derive(Debug)]
pub struct PreparedNetwork {
    pub graph: WeightedGraph,
    /// Declared coordinate reference system of the network layer
    pub crs: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Remove repeated vertices and drop edges that are not usable lines
///
/// Returns the kept edges and how many were dropped. An edge is dropped
/// when a coordinate is not finite or fewer than two distinct vertices
/// remain.
pub fn fix_geometry(edges: Vec<NetworkEdge>) -> (Vec<NetworkEdge>, usize) {
    let total = edges.len();
    let fixed: Vec<NetworkEdge> = edges.into_iter().filter_map(fix_edge).collect();
    let dropped = total - fixed.len();
    (fixed, dropped)
}

fn fix_edge(mut edge: NetworkEdge) -> Option<NetworkEdge> {
    if edge
        .geometry
        .coords()
        .any(|c| !(c.x.is_finite() && c.y.is_finite()))
    {
        return None;
    }

    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(edge.geometry.0.len());
    let mut zs: Vec<f64> = Vec::new();
    for (i, coord) in edge.geometry.0.iter().enumerate() {
        if coords.last() == Some(coord) {
            continue;
        }
        coords.push(*coord);
        if let Some(vertex_z) = &edge.vertex_z {
            zs.push(vertex_z.get(i).copied().unwrap_or(f64::NAN));
        }
    }
    if coords.len() < 2 {
        return None;
    }

    edge.geometry = LineString::new(coords);
    if edge.vertex_z.is_some() {
        edge.vertex_z = Some(zs);
    }
    Some(edge)
}

/// Fix geometry, drape over the surface when there is one, and weigh
///
/// # Errors
///
/// Fails when the network is empty or has no valid edge, and when the
/// elevation surface reports itself invalid.
pub fn prepare_network(
    edges: Vec<NetworkEdge>,
    surface: Option<&dyn ElevationSurface>,
    profile: WeightingProfile,
    feedback: &dyn Feedback,
) -> Result<PreparedNetwork, Error> {
    if edges.is_empty() {
        return Err(Error::MissingLayer("network has no features".to_string()));
    }
    let mut diagnostics = Vec::new();

    let (edges, dropped) = fix_geometry(edges);
    if dropped > 0 {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::warning(format!("Dropped {dropped} network edges with unusable geometry")),
        );
    }
    if edges.is_empty() {
        return Err(Error::InvalidData("no network edge has a valid geometry".to_string()));
    }

    let edges = match surface {
        Some(surface) if !surface.is_valid() => {
            return Err(Error::SurfaceBuild("elevation surface is not valid".to_string()));
        }
        Some(surface) => {
            info!("Draping {} edges over the elevation surface", edges.len());
            edges.par_iter().map(|edge| drape(surface, edge)).collect()
        }
        None => edges,
    };

    let graph = EdgeCostModel::default().build_graph(&edges, profile);
    if graph.bounding_rect().is_some_and(looks_geographic) {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::warning(
                "Network coordinates look geographic (degrees); lengths, buffers and areas will be meaningless",
            ),
        );
    }
    info!(
        "Weighted graph ready: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(PreparedNetwork {
        graph,
        crs: None,
        diagnostics,
    })
}
