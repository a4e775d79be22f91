use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No network edge found to snap the origin to")]
    NoEdgesFound,
    #[error("Origin is not resolvable: {0}")]
    UnresolvableOrigin(String),
    #[error("Missing required input layer: {0}")]
    MissingLayer(String),
    #[error("Could not parse budget list: {0}")]
    BudgetParse(String),
    #[error("Elevation surface build failed: {0}")]
    SurfaceBuild(String),
    #[error("Reachability error: {0}")]
    Reachability(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Isochrone error: {0}")]
    IsochroneError(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}
