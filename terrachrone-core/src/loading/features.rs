//! Helpers shared by the GeoJSON readers

use std::path::Path;
use std::str::FromStr;

use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value as JsonValue;

use crate::Error;

/// Read a `FeatureCollection` from a file
pub(crate) fn read_feature_collection(path: &Path) -> Result<FeatureCollection, Error> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let dataset = GeoJson::from_str(&contents)
        .map_err(|e| Error::GeoJsonError(format!("{}: {e}", path.display())))?;

    match dataset {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(Error::InvalidData(format!(
            "{} holds a bare geometry, a FeatureCollection is required",
            path.display()
        ))),
    }
}

/// Parse a number written with either `.` or `,` as decimal mark
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric property value; numeric strings are accepted
pub(crate) fn number_property(feature: &Feature, name: &str) -> Option<f64> {
    match feature.property(name)? {
        JsonValue::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(text) => parse_decimal(text),
        _ => None,
    }
}

/// Edge id from a property, the feature id, or the fallback position
pub(crate) fn feature_id(feature: &Feature, id_field: Option<&str>, fallback: u64) -> u64 {
    let from_field = id_field
        .and_then(|name| number_property(feature, name))
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64);
    let from_id = match &feature.id {
        Some(geojson::feature::Id::Number(n)) => n.as_u64(),
        Some(geojson::feature::Id::String(s)) => s.parse().ok(),
        None => None,
    };
    from_field.or(from_id).unwrap_or(fallback)
}

/// Planar geometry of a feature, `None` when it has none
pub(crate) fn planar_geometry(feature: &Feature) -> Result<Option<geo::Geometry<f64>>, Error> {
    let Some(geometry) = &feature.geometry else {
        return Ok(None);
    };
    geo::Geometry::<f64>::try_from(geometry.clone())
        .map(Some)
        .map_err(|e| Error::GeoJsonError(e.to_string()))
}

/// Z ordinates of every line in a `LineString` or `MultiLineString`
///
/// A line gets `None` unless all of its positions carry a third ordinate.
pub(crate) fn line_z(feature: &Feature) -> Vec<Option<Vec<f64>>> {
    let Some(geometry) = &feature.geometry else {
        return Vec::new();
    };
    let Ok(json) = serde_json::to_value(geometry) else {
        return Vec::new();
    };
    let coordinates = &json["coordinates"];
    match json["type"].as_str() {
        Some("LineString") => vec![positions_z(coordinates)],
        Some("MultiLineString") => coordinates
            .as_array()
            .map(|lines| lines.iter().map(positions_z).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn positions_z(positions: &JsonValue) -> Option<Vec<f64>> {
    positions
        .as_array()?
        .iter()
        .map(|position| position.get(2).and_then(JsonValue::as_f64))
        .collect()
}

/// Name from a legacy `"crs": {"properties": {"name": ...}}` member
pub(crate) fn legacy_crs(collection: &FeatureCollection) -> Option<String> {
    collection
        .foreign_members
        .as_ref()?
        .get("crs")?
        .pointer("/properties/name")?
        .as_str()
        .map(str::to_string)
}
