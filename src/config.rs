//! TOML run files
//!
//! ```toml
//! [network]
//! path = "roads.geojson"
//!
//! [terrain]
//! contours = "contours.geojson"
//! elevation_field = "elev"
//!
//! [isochrones]
//! origin = "POINT(412300 6178150)"
//! budgets = "5,10,15"
//! mode = "walk"
//!
//! [output]
//! isochrones = "isochrones.geojson"
//! ```
//!
//! Relative paths are resolved against the directory of the run file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use terrachrone_core::loading::{NetworkConfig, PopulationConfig, TerrainConfig};
use terrachrone_core::{TravelBudget, TravelMode};

use crate::error::CliError;
use crate::origins::OriginSpec;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunFile {
    pub network: NetworkConfig,
    #[serde(default)]
    pub terrain: Option<TerrainConfig>,
    #[serde(default)]
    pub population: Option<PopulationConfig>,
    #[serde(default)]
    pub isochrones: Option<IsochronesSection>,
    #[serde(default)]
    pub dual: Option<DualSection>,
    pub output: OutputConfig,
}

/// Single origin, several budgets
#[derive(Debug, Clone, Deserialize)]
pub struct IsochronesSection {
    /// `POINT(x y)` or `x,y`
    pub origin: String,
    #[serde(default)]
    pub budgets: Option<BudgetSpec>,
    /// `walk`, `walk_flat`, `cycle` or `drive`
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_isochrone_buffer")]
    pub buffer: f64,
}

/// Two origin sets, one cost limit
#[derive(Debug, Clone, Deserialize)]
pub struct DualSection {
    pub origins_a: OriginSpec,
    pub origins_b: OriginSpec,
    #[serde(default = "default_cost_limit")]
    pub cost_limit: f64,
    #[serde(default = "default_dual_buffer")]
    pub buffer: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub isochrones: PathBuf,
    #[serde(default)]
    pub start_point: Option<PathBuf>,
    /// Draped and weighted network
    #[serde(default)]
    pub network: Option<PathBuf>,
}

/// Budgets as a list of numbers or as text such as `"2,5;7,5"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BudgetSpec {
    Values(Vec<f64>),
    Text(String),
}

impl BudgetSpec {
    pub fn to_budget(&self) -> Result<TravelBudget, terrachrone_core::Error> {
        match self {
            BudgetSpec::Values(values) => TravelBudget::from_values(values.clone()),
            BudgetSpec::Text(text) => TravelBudget::parse(text),
        }
    }
}

fn default_isochrone_buffer() -> f64 {
    50.0
}

fn default_dual_buffer() -> f64 {
    35.0
}

fn default_cost_limit() -> f64 {
    500.0
}

fn default_mode() -> String {
    "walk".to_string()
}

fn default_budgets() -> BudgetSpec {
    BudgetSpec::Values(vec![10.0])
}

impl IsochronesSection {
    pub fn budget_spec(&self) -> BudgetSpec {
        self.budgets.clone().unwrap_or_else(default_budgets)
    }

    pub fn travel_mode(&self) -> Result<TravelMode, terrachrone_core::Error> {
        self.mode.parse()
    }
}

impl RunFile {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::RunFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut run: RunFile = toml::from_str(&text)?;
        if let Some(base) = path.parent() {
            run.resolve_paths(base);
        }
        Ok(run)
    }

    fn resolve_paths(&mut self, base: &Path) {
        resolve(base, &mut self.network.path);
        if let Some(terrain) = &mut self.terrain {
            resolve(base, &mut terrain.contours);
        }
        if let Some(population) = &mut self.population {
            resolve(base, &mut population.path);
        }
        if let Some(dual) = &mut self.dual {
            for spec in [&mut dual.origins_a, &mut dual.origins_b] {
                if let OriginSpec::File(path) = spec {
                    resolve(base, path);
                }
            }
        }
        resolve(base, &mut self.output.isochrones);
        for path in [&mut self.output.start_point, &mut self.output.network]
            .into_iter()
            .flatten()
        {
            resolve(base, path);
        }
    }
}

fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}
