use terrachrone_core::loading::{LoadedLayer, build_network, check_origin_coverage, crs_mismatch, load_population};
use terrachrone_core::pipeline::{Feedback, LogFeedback, MultiThresholdRequest, run_multi_threshold};
use terrachrone_core::{DijkstraServiceArea, TravelBudget, WeightingProfile};
use tracing::{info, warn};

use crate::config::RunFile;
use crate::error::CliError;
use crate::origins::parse_point;
use crate::output::write_layer;
use crate::signal;

/// Single origin, ascending budgets
pub fn run(file: &RunFile, budgets: Option<&str>) -> Result<(), CliError> {
    let section = file
        .isochrones
        .as_ref()
        .ok_or(CliError::MissingSection("isochrones"))?;
    let budgets = match budgets {
        Some(text) => TravelBudget::parse(text)?,
        None => section.budget_spec().to_budget()?,
    };
    let origin = parse_point(&section.origin)?;
    let mode = section.travel_mode()?;
    let feedback = LogFeedback::default();
    signal::cancel_on_interrupt(feedback.token().clone())?;

    let (prepared, population) = rayon::join(
        || {
            build_network(
                &file.network,
                file.terrain.as_ref(),
                WeightingProfile::Mode(mode),
                &feedback,
            )
        },
        || file.population.as_ref().map(load_population).transpose(),
    );
    let prepared = prepared?;
    let population = population?;

    if let Some(layer) = &population {
        if let Some(message) = crs_mismatch("Population", prepared.crs.as_deref(), layer.crs.as_deref()) {
            warn!("{message}");
        }
    }
    let population = population.map(LoadedLayer::into_population);

    if let Some(diagnostic) = check_origin_coverage(&prepared.graph, &[origin]) {
        feedback.report(&diagnostic);
    }

    let request = MultiThresholdRequest {
        origin,
        budgets,
        mode,
        buffer_distance: section.buffer,
        declared_speeds: file.network.speed_field.is_some(),
    };
    let run = run_multi_threshold(
        &prepared.graph,
        &DijkstraServiceArea,
        population.as_ref(),
        &request,
        &feedback,
    )?;

    write_layer(&file.output.isochrones, &run.records)?;
    if let Some(path) = &file.output.start_point {
        write_layer(path, [&run.start_point])?;
    }
    if let Some(path) = &file.output.network {
        write_layer(path, prepared.graph.edges())?;
    }

    let warnings = run
        .diagnostics
        .iter()
        .chain(&prepared.diagnostics)
        .filter(|d| d.is_warning())
        .count();
    info!(
        "{} of {} isochrone(s) written to {}, {warnings} warning(s)",
        run.records.len(),
        request.budgets.len(),
        file.output.isochrones.display()
    );
    if run.cancelled {
        warn!("Run was cancelled before every budget was processed");
    }
    if !run.failures.is_empty() {
        return Err(CliError::PartialRun(run.failures.len()));
    }
    Ok(())
}
