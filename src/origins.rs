//! Origins written inline in a run file or on the command line

use std::path::PathBuf;

use geo::Point;
use serde::Deserialize;
use terrachrone_core::loading::load_origins;
use wkt::TryFromWkt;

use crate::error::CliError;

/// Origin set: a point layer on disk or a list of inline points
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OriginSpec {
    Inline(Vec<String>),
    File(PathBuf),
}

impl OriginSpec {
    pub fn resolve(&self) -> Result<Vec<Point<f64>>, CliError> {
        match self {
            OriginSpec::Inline(points) => points.iter().map(|p| parse_point(p)).collect(),
            OriginSpec::File(path) => Ok(load_origins(path)?.features),
        }
    }
}

/// `POINT(x y)` or `x,y`
pub fn parse_point(text: &str) -> Result<Point<f64>, CliError> {
    let trimmed = text.trim();
    let invalid = |reason: String| CliError::Origin(text.to_string(), reason);

    let point = if trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
        Point::<f64>::try_from_wkt_str(trimmed).map_err(|e| invalid(e.to_string()))?
    } else {
        let parts: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();
        let [x, y] = parts.as_slice() else {
            return Err(invalid(format!("expected two coordinates, got {}", parts.len())));
        };
        let coordinate = |part: &str| {
            part.parse::<f64>()
                .map_err(|e| invalid(format!("'{part}': {e}")))
        };
        Point::new(coordinate(x)?, coordinate(y)?)
    };

    if !(point.x().is_finite() && point.y().is_finite()) {
        return Err(invalid("coordinates must be finite".to_string()));
    }
    Ok(point)
}
