//! Output records as `GeoJSON` features

use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::Error;
use crate::model::{IsochroneRecord, StartPointRecord, WeightedEdge};

/// Record that can be written as a `GeoJSON` feature
pub trait ToFeature {
    fn to_feature(&self) -> Result<Feature, Error>;
}

impl ToFeature for IsochroneRecord {
    fn to_feature(&self) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(&self.geometry));
        let properties = serde_json::to_value(self).map_err(|e| Error::GeoJsonError(e.to_string()))?;

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": properties,
        });
        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

impl ToFeature for StartPointRecord {
    fn to_feature(&self) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(&self.geometry));

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "id": self.id,
                "mode": self.mode,
            }
        });
        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

/// Weighted network edge with its derived fields
impl ToFeature for WeightedEdge {
    fn to_feature(&self) -> Result<Feature, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(&self.geometry));

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "id": self.source_id,
                "length": self.length,
                "delta_h": self.delta_h,
                "cost": self.cost,
                "speed_kmh": self.effective_speed,
            }
        });
        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

/// Collect features into a `FeatureCollection`
pub fn to_feature_collection<'a, R, I>(records: I) -> Result<FeatureCollection, Error>
where
    R: ToFeature + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let features = records
        .into_iter()
        .map(ToFeature::to_feature)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}
