use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Point;
use log::{debug, info};
use rayon::prelude::*;

use super::{Diagnostic, Feedback, emit};
use crate::algo::{AccessLeg, access_leg, population_sum, synthesize};
use crate::model::{IsochroneRecord, PopulationLayer, StartPointRecord, TravelBudget, TravelMode, WeightedGraph};
use crate::routing::{ReachabilityEngine, TravelStrategy};
use crate::{Error, Minutes};

/// Single origin, ascending budgets
#[derive(Debug, Clone)]
pub struct MultiThresholdRequest {
    pub origin: Point<f64>,
    /// Budgets in minutes, including the access walk
    pub budgets: TravelBudget,
    pub mode: TravelMode,
    /// Buffer around reached edges, in metres
    pub buffer_distance: f64,
    /// Whether edges carry declared speeds for this mode
    pub declared_speeds: bool,
}

#[derive(Debug)]
pub struct MultiThresholdRun {
    /// One record per emitted budget, budgets ascending
    pub records: Vec<IsochroneRecord>,
    pub start_point: StartPointRecord,
    pub access: AccessLeg,
    pub diagnostics: Vec<Diagnostic>,
    /// Budgets whose search or polygon failed; the other budgets still emit
    pub failures: Vec<BudgetFailure>,
    /// Whether the run stopped before every budget was processed
    pub cancelled: bool,
}

/// Error raised while evaluating one budget
#[derive(Debug)]
pub struct BudgetFailure {
    pub budget: Minutes,
    pub error: Error,
}

/// Strategy used for a mode
///
/// Slope-aware walking and declared speeds need per-edge speeds, so they
/// run on time; everything else runs on distance at the mode's speed.
pub fn strategy_for(mode: TravelMode, declared_speeds: bool) -> TravelStrategy {
    if mode.is_slope_aware() || declared_speeds {
        TravelStrategy::Time
    } else {
        TravelStrategy::Distance
    }
}

/// Budget handed to the engine for `net` minutes of in-network travel
fn engine_budget(strategy: TravelStrategy, mode: TravelMode, net: Minutes) -> f64 {
    match strategy {
        TravelStrategy::Time => net,
        TravelStrategy::Distance => mode.default_speed_kmh() * net / 60.0 * 1000.0,
    }
}

enum Outcome {
    Emitted(IsochroneRecord, Vec<Diagnostic>),
    Skipped(Vec<Diagnostic>),
    Cancelled,
}

/// Isochrones for one origin and every budget
///
/// Access time to the network is subtracted from each budget; budgets it
/// consumes entirely are skipped, as are budgets reaching nothing. Budgets
/// are independent units evaluated in parallel and merged back in
/// ascending order. Record ids are the 1-based budget positions. A budget
/// whose search or polygon fails is listed in
/// [`MultiThresholdRun::failures`] without discarding the others.
///
/// # Errors
///
/// Fails when the origin cannot be snapped onto the graph.
pub fn run_multi_threshold(
    graph: &WeightedGraph,
    engine: &dyn ReachabilityEngine,
    population: Option<&PopulationLayer>,
    request: &MultiThresholdRequest,
    feedback: &dyn Feedback,
) -> Result<MultiThresholdRun, Error> {
    let mut diagnostics = Vec::new();
    let access = access_leg(graph, request.origin)?;
    emit(
        feedback,
        &mut diagnostics,
        Diagnostic::info(format!(
            "Origin is {:.1} m from the network, access time {:.2} min",
            access.distance, access.minutes
        )),
    );

    if let Some(layer) = population {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::info(format!("Loaded {} population samples", layer.len())),
        );
    }

    let strategy = strategy_for(request.mode, request.declared_speeds);
    let label = request.mode.label();
    let total = request.budgets.len();
    let done = AtomicUsize::new(0);
    info!("Computing {total} isochrone(s) for {label} with {strategy:?} strategy");

    let outcomes: Vec<Result<Outcome, Error>> = request
        .budgets
        .values()
        .par_iter()
        .enumerate()
        .map(|(position, &budget)| {
            if feedback.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            let outcome = budget_unit(
                graph, engine, population, request, strategy, &access, position, budget, feedback,
            );
            feedback.progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
            outcome
        })
        .collect();

    let mut records = Vec::with_capacity(total);
    let mut failures = Vec::new();
    let mut cancelled = false;
    for (&budget, outcome) in request.budgets.values().iter().zip(outcomes) {
        match outcome {
            Ok(Outcome::Emitted(record, notes)) => {
                diagnostics.extend(notes);
                records.push(record);
            }
            Ok(Outcome::Skipped(notes)) => diagnostics.extend(notes),
            Ok(Outcome::Cancelled) => cancelled = true,
            Err(error) => {
                emit(
                    feedback,
                    &mut diagnostics,
                    Diagnostic::warning(format!("{budget} min failed: {error}")),
                );
                failures.push(BudgetFailure { budget, error });
            }
        }
    }
    if cancelled {
        emit(
            feedback,
            &mut diagnostics,
            Diagnostic::warning(format!(
                "Cancelled, {} of {total} isochrone(s) were finished",
                records.len()
            )),
        );
    }

    Ok(MultiThresholdRun {
        records,
        start_point: StartPointRecord {
            id: 1,
            mode: label.to_string(),
            geometry: request.origin,
        },
        access,
        diagnostics,
        failures,
        cancelled,
    })
}

#[allow(clippy::too_many_arguments)]
fn budget_unit(
    graph: &WeightedGraph,
    engine: &dyn ReachabilityEngine,
    population: Option<&PopulationLayer>,
    request: &MultiThresholdRequest,
    strategy: TravelStrategy,
    access: &AccessLeg,
    position: usize,
    budget: Minutes,
    feedback: &dyn Feedback,
) -> Result<Outcome, Error> {
    let mut notes = Vec::new();
    let net = budget - access.minutes;
    if net <= 0.0 {
        emit(
            feedback,
            &mut notes,
            Diagnostic::warning(format!(
                "{budget} min: access walk takes {:.2} min, nothing is reachable",
                access.minutes
            )),
        );
        return Ok(Outcome::Skipped(notes));
    }

    let engine_budget = engine_budget(strategy, request.mode, net);
    debug!("{budget} min: net {net:.3} min, engine budget {engine_budget:.3}");
    let subnetwork = engine.reachable(graph, &[request.origin], engine_budget, strategy)?;
    if subnetwork.is_empty() {
        emit(
            feedback,
            &mut notes,
            Diagnostic::warning(format!("{budget} min: no edge reachable, skipped")),
        );
        return Ok(Outcome::Skipped(notes));
    }

    let Some(polygon) = synthesize(&subnetwork, request.buffer_distance)? else {
        emit(
            feedback,
            &mut notes,
            Diagnostic::warning(format!("{budget} min: reachable edges produced no polygon, skipped")),
        );
        return Ok(Outcome::Skipped(notes));
    };

    let pop_sum = population.map(|layer| population_sum(layer, &polygon));
    let record = IsochroneRecord::new(position as i64 + 1, budget, request.mode.label(), polygon)
        .with_population(pop_sum);
    emit(
        feedback,
        &mut notes,
        Diagnostic::info(format!(
            "{budget} min: {} edges, {:.4} km²",
            subnetwork.len(),
            record.area_km2
        )),
    );
    Ok(Outcome::Emitted(record, notes))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use geo::{Euclidean, Length, LineString, MultiLineString, line_string};

    use super::*;
    use crate::model::WeightedEdge;
    use crate::pipeline::testing::RecordingFeedback;
    use crate::routing::{Coverage, ReachableSubnetwork, ReachedEdge};

    /// Returns a stub segment whose length equals the budget it was given
    #[derive(Default)]
    struct StubEngine {
        calls: Mutex<Vec<(f64, TravelStrategy)>>,
    }

    impl ReachabilityEngine for StubEngine {
        fn reachable(
            &self,
            _graph: &WeightedGraph,
            _origins: &[Point<f64>],
            budget: f64,
            strategy: TravelStrategy,
        ) -> Result<ReachableSubnetwork, Error> {
            self.calls.lock().unwrap().push((budget, strategy));
            Ok(ReachableSubnetwork {
                edges: vec![ReachedEdge {
                    source_id: 1,
                    coverage: Coverage::Full,
                    geometry: MultiLineString::new(vec![line_string![
                        (x: 0.0, y: 0.0),
                        (x: budget, y: 0.0)
                    ]]),
                }],
            })
        }
    }

    struct NothingReachable;

    impl ReachabilityEngine for NothingReachable {
        fn reachable(
            &self,
            _graph: &WeightedGraph,
            _origins: &[Point<f64>],
            _budget: f64,
            _strategy: TravelStrategy,
        ) -> Result<ReachableSubnetwork, Error> {
            Ok(ReachableSubnetwork::default())
        }
    }

    fn line_graph() -> WeightedGraph {
        let geometry: LineString<f64> = line_string![(x: 0.0, y: 0.0), (x: 5000.0, y: 0.0)];
        let length = Euclidean.length(&geometry);
        WeightedGraph::from_edges(vec![WeightedEdge {
            source_id: 1,
            geometry,
            length,
            delta_h: 0.0,
            cost: length,
            effective_speed: 4.0,
        }])
    }

    fn request(origin: Point<f64>, budgets: &str, mode: TravelMode) -> MultiThresholdRequest {
        MultiThresholdRequest {
            origin,
            budgets: TravelBudget::parse(budgets).unwrap(),
            mode,
            buffer_distance: 50.0,
            declared_speeds: false,
        }
    }

    #[test]
    fn strategy_follows_the_mode() {
        assert_eq!(strategy_for(TravelMode::Pedestrian { with_slope: true }, false), TravelStrategy::Time);
        assert_eq!(strategy_for(TravelMode::Pedestrian { with_slope: false }, false), TravelStrategy::Distance);
        assert_eq!(strategy_for(TravelMode::Cycle, true), TravelStrategy::Time);
        assert_eq!(strategy_for(TravelMode::Drive, false), TravelStrategy::Distance);
    }

    #[test]
    fn access_time_is_subtracted_and_short_budgets_skipped() {
        let engine = StubEngine::default();
        let feedback = RecordingFeedback::default();
        let run = run_multi_threshold(
            &line_graph(),
            &engine,
            None,
            &request(Point::new(2500.0, 200.0), "2,10", TravelMode::Pedestrian { with_slope: true }),
            &feedback,
        )
        .unwrap();

        assert!((run.access.minutes - 3.0).abs() < 1e-9);
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].id, 2);
        assert_eq!(run.records[0].t_min, 10.0);
        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!((calls[0].0 - 7.0).abs() < 1e-9);
        assert_eq!(calls[0].1, TravelStrategy::Time);
        assert!(run.diagnostics.iter().any(|d| d.is_warning() && d.message.starts_with("2 min")));
    }

    #[test]
    fn distance_strategy_converts_minutes_to_metres() {
        let engine = StubEngine::default();
        run_multi_threshold(
            &line_graph(),
            &engine,
            None,
            &request(Point::new(100.0, 0.0), "15", TravelMode::Cycle),
            &RecordingFeedback::default(),
        )
        .unwrap();
        let calls = engine.calls.lock().unwrap();
        assert!((calls[0].0 - 3750.0).abs() < 1e-9);
        assert_eq!(calls[0].1, TravelStrategy::Distance);
    }

    #[test]
    fn records_keep_budget_order() {
        let run = run_multi_threshold(
            &line_graph(),
            &StubEngine::default(),
            None,
            &request(Point::new(0.0, 0.0), "30;10;20", TravelMode::Drive),
            &RecordingFeedback::default(),
        )
        .unwrap();
        let ids: Vec<i64> = run.records.iter().map(|r| r.id).collect();
        let minutes: Vec<f64> = run.records.iter().map(|r| r.t_min).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(minutes, vec![10.0, 20.0, 30.0]);
        assert!(run.records.windows(2).all(|w| w[0].area_km2 <= w[1].area_km2));
        assert_eq!(run.start_point.mode, "drive");
        assert!(run.records.iter().all(|r| r.pop_sum.is_none()));
    }

    #[test]
    fn empty_reach_is_skipped_not_fatal() {
        let run = run_multi_threshold(
            &line_graph(),
            &NothingReachable,
            None,
            &request(Point::new(0.0, 0.0), "5,10", TravelMode::Drive),
            &RecordingFeedback::default(),
        )
        .unwrap();
        assert!(run.records.is_empty());
        assert_eq!(run.diagnostics.iter().filter(|d| d.is_warning()).count(), 2);
    }

    #[test]
    fn cancelled_run_keeps_nothing_after_the_flag() {
        let feedback = RecordingFeedback::default();
        feedback.token.cancel();
        let run = run_multi_threshold(
            &line_graph(),
            &StubEngine::default(),
            None,
            &request(Point::new(0.0, 0.0), "5,10,15", TravelMode::Drive),
            &feedback,
        )
        .unwrap();
        assert!(run.cancelled);
        assert!(run.records.is_empty());
    }

    /// Fails for every budget above `limit`, otherwise behaves like [`StubEngine`]
    struct FailAbove(f64);

    impl ReachabilityEngine for FailAbove {
        fn reachable(
            &self,
            graph: &WeightedGraph,
            origins: &[Point<f64>],
            budget: f64,
            strategy: TravelStrategy,
        ) -> Result<ReachableSubnetwork, Error> {
            if budget > self.0 {
                return Err(Error::Reachability("search exhausted".to_string()));
            }
            StubEngine::default().reachable(graph, origins, budget, strategy)
        }
    }

    #[test]
    fn failed_budget_keeps_the_others() {
        // drive at 20 km/h: 333 m, 667 m and 1000 m
        let run = run_multi_threshold(
            &line_graph(),
            &FailAbove(700.0),
            None,
            &request(Point::new(0.0, 0.0), "1,2,3", TravelMode::Drive),
            &RecordingFeedback::default(),
        )
        .unwrap();

        let ids: Vec<i64> = run.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].budget, 3.0);
        assert!(matches!(run.failures[0].error, Error::Reachability(_)));
        assert!(run.diagnostics.iter().any(|d| d.is_warning() && d.message.starts_with("3 min failed")));
        assert!(!run.cancelled);
    }

    #[test]
    fn cancelling_mid_run_returns_finished_budgets() {
        let feedback = RecordingFeedback {
            cancel_after: Some(1),
            ..RecordingFeedback::default()
        };
        // one worker, so budgets are taken in order
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let run = pool
            .install(|| {
                run_multi_threshold(
                    &line_graph(),
                    &StubEngine::default(),
                    None,
                    &request(Point::new(0.0, 0.0), "1,2,3,4,5,6,7,8", TravelMode::Drive),
                    &feedback,
                )
            })
            .unwrap();

        assert!(run.cancelled);
        let ids: Vec<i64> = run.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(feedback.progress_calls.load(Ordering::SeqCst), 1);
        assert!(run.diagnostics.iter().any(|d| d.message.starts_with("Cancelled, 1 of 8")));
    }

    #[test]
    fn population_is_summed_when_supplied() {
        use crate::model::PopulationSample;
        use geo::Geometry;

        let layer = PopulationLayer::new(vec![
            PopulationSample::new(Geometry::Point(Point::new(10.0, 0.0)), 12.0).unwrap(),
        ]);
        let run = run_multi_threshold(
            &line_graph(),
            &StubEngine::default(),
            Some(&layer),
            &request(Point::new(0.0, 0.0), "1", TravelMode::Drive),
            &RecordingFeedback::default(),
        )
        .unwrap();
        assert_eq!(run.records[0].pop_sum, Some(12.0));
        let counts: Vec<_> = run
            .diagnostics
            .iter()
            .filter(|d| d.message.contains("population samples"))
            .collect();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].message, "Loaded 1 population samples");
    }
}
