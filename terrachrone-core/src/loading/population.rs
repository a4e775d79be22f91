use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use geo::{Geometry, Point};
use log::warn;

use super::LoadedLayer;
use super::config::PopulationConfig;
use super::features::{legacy_crs, number_property, parse_decimal, planar_geometry, read_feature_collection};
use crate::Error;
use crate::model::{PopulationLayer, PopulationSample};

/// Read population samples from GeoJSON, or from CSV points for `.csv` paths
///
/// Samples with a missing, non-numeric, negative or non-finite weight and
/// samples without geometry are skipped.
///
/// # Errors
///
/// Fails when the file cannot be read, or when a CSV file lacks one of the
/// configured columns.
pub fn load_population(config: &PopulationConfig) -> Result<LoadedLayer<PopulationSample>, Error> {
    let is_csv = config
        .path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let layer = if is_csv {
        read_csv(config)?
    } else {
        read_geojson(config)?
    };

    if layer.skipped > 0 {
        warn!("Skipped {} population samples without a usable weight", layer.skipped);
    }
    Ok(layer)
}

impl LoadedLayer<PopulationSample> {
    /// Spatially indexed layer for aggregation
    pub fn into_population(self) -> PopulationLayer {
        PopulationLayer::new(self.features)
    }
}

fn read_geojson(config: &PopulationConfig) -> Result<LoadedLayer<PopulationSample>, Error> {
    let collection = read_feature_collection(&config.path)?;
    let crs = config.crs.clone().or_else(|| legacy_crs(&collection));

    let mut samples = Vec::with_capacity(collection.features.len());
    let mut skipped = 0;
    for feature in &collection.features {
        let sample = planar_geometry(feature)?.and_then(|geometry| {
            number_property(feature, &config.weight_field)
                .and_then(|weight| PopulationSample::new(geometry, weight))
        });
        match sample {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }

    Ok(LoadedLayer {
        features: samples,
        crs,
        skipped,
    })
}

/// `;` separated files usually pair with decimal commas
fn sniff_delimiter(path: &Path) -> Result<u8, Error> {
    let mut header = String::new();
    BufReader::new(File::open(path)?).read_line(&mut header)?;
    Ok(if header.contains(';') { b';' } else { b',' })
}

fn read_csv(config: &PopulationConfig) -> Result<LoadedLayer<PopulationSample>, Error> {
    let delimiter = sniff_delimiter(&config.path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(&config.path)?;

    let headers = reader.headers()?.clone();
    for column in [&config.x_field, &config.y_field, &config.weight_field] {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::InvalidData(format!(
                "column '{column}' not found in {}",
                config.path.display()
            )));
        }
    }

    let mut samples = Vec::new();
    let mut skipped = 0;
    for row in reader.deserialize::<HashMap<String, String>>() {
        let row = row?;
        let value = |column: &str| row.get(column).and_then(|text| parse_decimal(text));
        let sample = match (value(&config.x_field), value(&config.y_field), value(&config.weight_field)) {
            (Some(x), Some(y), Some(weight)) => {
                PopulationSample::new(Geometry::Point(Point::new(x, y)), weight)
            }
            _ => None,
        };
        match sample {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }

    Ok(LoadedLayer {
        features: samples,
        crs: config.crs.clone(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config(path: &Path) -> PopulationConfig {
        PopulationConfig {
            path: path.to_path_buf(),
            weight_field: "pop".to_string(),
            x_field: "x".to_string(),
            y_field: "y".to_string(),
            crs: None,
        }
    }

    #[test]
    fn csv_with_decimal_commas() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x;y;pop").unwrap();
        writeln!(file, "10,5;20;12,5").unwrap();
        writeln!(file, "11;21;n/a").unwrap();
        writeln!(file, "12;22;-4").unwrap();
        writeln!(file, "13;23;8").unwrap();

        let layer = load_population(&config(file.path())).unwrap();
        assert_eq!(layer.features.len(), 2);
        assert_eq!(layer.skipped, 2);
        assert_eq!(layer.features[0].weight, 12.5);
        assert_eq!(layer.features[0].geometry, Geometry::Point(Point::new(10.5, 20.0)));
    }

    #[test]
    fn csv_without_weight_column_fails() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x,y,people").unwrap();
        writeln!(file, "1,2,3").unwrap();
        assert!(matches!(
            load_population(&config(file.path())),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn geojson_skips_bad_weights() {
        let mut file = tempfile::Builder::new().suffix(".geojson").tempfile().unwrap();
        write!(
            file,
            r#"{{"type": "FeatureCollection", "features": [
                {{"type": "Feature", "properties": {{"pop": 40}},
                  "geometry": {{"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 0]]]}}}},
                {{"type": "Feature", "properties": {{"pop": "many"}},
                  "geometry": {{"type": "Point", "coordinates": [1, 1]}}}},
                {{"type": "Feature", "properties": {{"pop": 3}}, "geometry": null}}
            ]}}"#
        )
        .unwrap();
        let layer = load_population(&config(file.path())).unwrap();
        assert_eq!(layer.features.len(), 1);
        assert_eq!(layer.skipped, 2);
        assert_eq!(layer.into_population().len(), 1);
    }
}
