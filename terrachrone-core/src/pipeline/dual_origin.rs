use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Point;
use log::info;

use super::{Diagnostic, Feedback, emit};
use crate::algo::{intersect, population_sum, synthesize};
use crate::model::{IsochronePolygon, IsochroneRecord, PopulationLayer, TravelBudget, WeightedGraph};
use crate::routing::{ReachabilityEngine, TravelStrategy};
use crate::{Error, Minutes};

/// Two origin sets sharing one cost limit
#[derive(Debug, Clone)]
pub struct DualOriginRequest {
    pub origins_a: Vec<Point<f64>>,
    pub origins_b: Vec<Point<f64>>,
    /// Cost limit in cost units; one unit is one second at the cost-equivalent speed
    pub cost_limit: f64,
    pub buffer_distance: f64,
}

impl DualOriginRequest {
    /// Limit expressed as minutes for the time strategy
    pub fn limit_minutes(&self) -> Minutes {
        self.cost_limit / 60.0
    }
}

#[derive(Debug)]
pub struct DualOriginRun {
    /// `origin_a`, `origin_b` and `shared`, in that order, when produced
    pub records: Vec<IsochroneRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
}

const LABELS: [&str; 3] = ["origin_a", "origin_b", "shared"];

/// Isochrones of two origin sets and their intersection
///
/// The graph is expected to be weighted with the cost-equivalent profile.
/// Both sets run concurrently; a set reaching nothing is skipped with a
/// warning, and so is an empty intersection.
///
/// # Errors
///
/// Fails when the limit is not a positive number, when either origin set is empty,
/// and when the engine or polygon synthesis fail.
pub fn run_dual_origin(
    graph: &WeightedGraph,
    engine: &dyn ReachabilityEngine,
    population: Option<&PopulationLayer>,
    request: &DualOriginRequest,
    feedback: &dyn Feedback,
) -> Result<DualOriginRun, Error> {
    TravelBudget::single(request.cost_limit)?;
    if request.origins_a.is_empty() {
        return Err(Error::MissingLayer("origin set A has no points".to_string()));
    }
    if request.origins_b.is_empty() {
        return Err(Error::MissingLayer("origin set B has no points".to_string()));
    }

    let mut diagnostics = Vec::new();
    if let Some(layer) = population {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::info(format!("Loaded {} population samples", layer.len())),
        );
    }

    let minutes = request.limit_minutes();
    info!(
        "Dual-origin run: {} + {} origins, limit {} ({minutes:.2} min)",
        request.origins_a.len(),
        request.origins_b.len(),
        request.cost_limit
    );

    let done = AtomicUsize::new(0);
    let isochrone_of = |origins: &[Point<f64>]| -> Result<Option<Option<IsochronePolygon>>, Error> {
        if feedback.is_cancelled() {
            return Ok(None);
        }
        let subnetwork = engine.reachable(graph, origins, minutes, TravelStrategy::Time)?;
        let polygon = synthesize(&subnetwork, request.buffer_distance)?;
        feedback.progress(done.fetch_add(1, Ordering::Relaxed) + 1, 2);
        Ok(Some(polygon))
    };
    let (a, b) = rayon::join(
        || isochrone_of(&request.origins_a),
        || isochrone_of(&request.origins_b),
    );
    let (a, b) = (a?, b?);
    let cancelled = a.is_none() || b.is_none();

    let record = |index: usize, polygon: IsochronePolygon| {
        let pop_sum = population.map(|layer| population_sum(layer, &polygon));
        IsochroneRecord::new(index as i64 + 1, minutes, LABELS[index], polygon).with_population(pop_sum)
    };

    let mut sides: [Option<IsochronePolygon>; 2] = [None, None];
    for (index, outcome) in [a, b].into_iter().enumerate() {
        match outcome {
            Some(Some(polygon)) => sides[index] = Some(polygon),
            Some(None) => emit(
                feedback,
                &mut diagnostics,
                Diagnostic::warning(format!("{}: no edge reachable, skipped", LABELS[index])),
            ),
            None => {}
        }
    }

    let shared = match &sides {
        [Some(polygon_a), Some(polygon_b)] => Some(intersect(polygon_a, polygon_b)),
        _ => None,
    };
    let mut records: Vec<IsochroneRecord> = sides
        .into_iter()
        .enumerate()
        .filter_map(|(index, polygon)| polygon.map(|polygon| record(index, polygon)))
        .collect();
    match shared {
        Some(shared) if !shared.is_empty() => records.push(record(2, shared)),
        Some(_) => emit(
            feedback,
            &mut diagnostics,
            Diagnostic::warning("The two isochrones do not overlap, no shared area"),
        ),
        None => {}
    }

    if cancelled {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::warning("Cancelled before both origin sets were processed"),
        );
    }
    for record in &records {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::info(format!("{}: {:.4} km²", record.mode, record.area_km2)),
        );
    }

    Ok(DualOriginRun {
        records,
        diagnostics,
        cancelled,
    })
}
