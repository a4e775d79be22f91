use geo::Rect;

/// Whether a bounding box fits in longitude/latitude range
///
/// Projected metre coordinates almost never fall within ±180 / ±90 unless
/// the data sits right at a projection origin, so this is only used for a
/// warning.
pub fn looks_geographic(rect: Rect<f64>) -> bool {
    let (min, max) = (rect.min(), rect.max());
    (-180.0..=180.0).contains(&min.x)
        && (-180.0..=180.0).contains(&max.x)
        && (-90.0..=90.0).contains(&min.y)
        && (-90.0..=90.0).contains(&max.y)
}

/// Message for an auxiliary layer whose CRS differs from the network's
///
/// Layers without a declared CRS are assumed to match.
pub fn crs_mismatch(layer: &str, network: Option<&str>, other: Option<&str>) -> Option<String> {
    match (network, other) {
        (Some(network), Some(other)) if !same_crs(network, other) => Some(format!(
            "{layer} layer is in {other} but the network is in {network}; reproject it first"
        )),
        _ => None,
    }
}

/// Compares `EPSG:32637`, `epsg:32637` and `urn:ogc:def:crs:EPSG::32637` alike
fn same_crs(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(crs: &str) -> String {
    let upper = crs.trim().to_ascii_uppercase();
    match upper.rsplit_once("EPSG:") {
        Some((_, code)) => format!("EPSG:{}", code.trim_start_matches(':')),
        None => upper,
    }
}
