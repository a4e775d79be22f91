use terrachrone_core::loading::{LoadedLayer, build_network, check_origin_coverage, crs_mismatch, load_population};
use terrachrone_core::pipeline::{DualOriginRequest, Feedback, LogFeedback, run_dual_origin};
use terrachrone_core::{DijkstraServiceArea, WeightingProfile};
use tracing::{info, warn};

use crate::config::RunFile;
use crate::error::CliError;
use crate::output::write_layer;
use crate::signal;

/// Two origin sets and the area both reach within one cost limit
pub fn run(file: &RunFile, cost_limit: Option<f64>) -> Result<(), CliError> {
    let section = file.dual.as_ref().ok_or(CliError::MissingSection("dual"))?;
    let origins_a = section.origins_a.resolve()?;
    let origins_b = section.origins_b.resolve()?;
    let feedback = LogFeedback::default();
    signal::cancel_on_interrupt(feedback.token().clone())?;

    let (prepared, population) = rayon::join(
        || {
            build_network(
                &file.network,
                file.terrain.as_ref(),
                WeightingProfile::CostEquivalent,
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

    for origins in [&origins_a, &origins_b] {
        if let Some(diagnostic) = check_origin_coverage(&prepared.graph, origins) {
            feedback.report(&diagnostic);
        }
    }

    let request = DualOriginRequest {
        origins_a,
        origins_b,
        cost_limit: cost_limit.unwrap_or(section.cost_limit),
        buffer_distance: section.buffer,
    };
    let run = run_dual_origin(
        &prepared.graph,
        &DijkstraServiceArea,
        population.as_ref(),
        &request,
        &feedback,
    )?;

    write_layer(&file.output.isochrones, &run.records)?;
    if let Some(path) = &file.output.network {
        write_layer(path, prepared.graph.edges())?;
    }

    info!(
        "{} polygon(s) for a cost limit of {} ({:.2} min) written to {}",
        run.records.len(),
        request.cost_limit,
        request.limit_minutes(),
        file.output.isochrones.display()
    );
    if run.cancelled {
        warn!("Run was cancelled before both origin sets were processed");
    }
    Ok(())
}
