//! Persisting run outputs
//!
//! A [`FeatureSink`] receives typed records one at a time. [`GeoJsonSink`]
//! writes them as a `FeatureCollection` file, [`MemorySink`] keeps them.

mod features;

pub use features::{ToFeature, to_feature_collection};

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use geojson::Feature;
use log::info;

use crate::Error;

/// Destination for output records
pub trait FeatureSink<R> {
    fn write(&mut self, record: &R) -> Result<(), Error>;

    /// Flush everything written so far
    fn finish(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_all<'a, I>(&mut self, records: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Clone)]
pub struct MemorySink<R> {
    pub records: Vec<R>,
}

impl<R> Default for MemorySink<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Clone> FeatureSink<R> for MemorySink<R> {
    fn write(&mut self, record: &R) -> Result<(), Error> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Writes a `GeoJSON` `FeatureCollection` on [`FeatureSink::finish`]
#[derive(Debug)]
pub struct GeoJsonSink {
    path: PathBuf,
    features: Vec<Feature>,
}

impl GeoJsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            features: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: ToFeature> FeatureSink<R> for GeoJsonSink {
    fn write(&mut self, record: &R) -> Result<(), Error> {
        self.features.push(record.to_feature()?);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        let collection = geojson::FeatureCollection {
            features: std::mem::take(&mut self.features),
            bbox: None,
            foreign_members: None,
        };
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer(writer, &collection).map_err(|e| Error::GeoJsonError(e.to_string()))?;
        info!(
            "Wrote {} features to {}",
            collection.features.len(),
            self.path.display()
        );
        Ok(())
    }
}
