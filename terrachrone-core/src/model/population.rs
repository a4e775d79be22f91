//! Population reference data

use geo::{BoundingRect, Geometry, Point, Rect};
use rstar::{AABB, RTree, RTreeObject};

/// Geometry carrying a non-negative population weight
#[derive(Debug, Clone)]
pub struct PopulationSample {
    pub geometry: Geometry<f64>,
    pub weight: f64,
}

impl PopulationSample {
    /// Returns `None` for weights that cannot count towards a sum
    pub fn new(geometry: Geometry<f64>, weight: f64) -> Option<Self> {
        (weight.is_finite() && weight >= 0.0).then_some(Self { geometry, weight })
    }
}

#[derive(Debug, Clone)]
struct SampleEnvelope {
    envelope: AABB<Point<f64>>,
    index: usize,
}

impl RTreeObject for SampleEnvelope {
    type Envelope = AABB<Point<f64>>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Read-only collection of population samples with a bounding-box index
#[derive(Debug)]
pub struct PopulationLayer {
    samples: Vec<PopulationSample>,
    index: RTree<SampleEnvelope>,
}

impl PopulationLayer {
    /// Samples without a bounding box (empty geometries) are dropped
    pub fn new(samples: Vec<PopulationSample>) -> Self {
        let samples: Vec<PopulationSample> = samples
            .into_iter()
            .filter(|s| s.geometry.bounding_rect().is_some())
            .collect();

        let entries = samples
            .iter()
            .enumerate()
            .filter_map(|(index, sample)| {
                sample.geometry.bounding_rect().map(|rect| SampleEnvelope {
                    envelope: envelope_of(rect),
                    index,
                })
            })
            .collect();

        Self {
            samples,
            index: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[PopulationSample] {
        &self.samples
    }

    /// Samples whose bounding box intersects `rect`
    pub fn candidates(&self, rect: Rect<f64>) -> impl Iterator<Item = &PopulationSample> {
        self.index
            .locate_in_envelope_intersecting(&envelope_of(rect))
            .map(|entry| &self.samples[entry.index])
    }
}

fn envelope_of(rect: Rect<f64>) -> AABB<Point<f64>> {
    AABB::from_corners(rect.min().into(), rect.max().into())
}
