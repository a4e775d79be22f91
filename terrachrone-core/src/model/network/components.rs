//! Network components - loaded edges, graph nodes and weighted edges

use geo::{Euclidean, Length, LineString, Point};

use crate::routing::TravelStrategy;

/// Road segment as read from the input layer
///
/// Geometry is never changed after loading; derived values live on
/// [`WeightedEdge`].
#[derive(Debug, Clone)]
pub struct NetworkEdge {
    /// Feature id of the segment
    pub id: u64,
    /// Segment polyline in a projected coordinate system
    pub geometry: LineString<f64>,
    /// Z ordinate of every vertex when the input was 3D
    pub vertex_z: Option<Vec<f64>>,
    /// Declared elevation difference overriding the draped one
    pub manual_elevation: Option<f64>,
    /// Declared speed in km/h for the selected travel mode
    pub declared_speed: Option<f64>,
}

impl NetworkEdge {
    pub fn new(id: u64, geometry: LineString<f64>) -> Self {
        Self {
            id,
            geometry,
            vertex_z: None,
            manual_elevation: None,
            declared_speed: None,
        }
    }

    #[must_use]
    pub fn with_vertex_z(mut self, vertex_z: Vec<f64>) -> Self {
        self.vertex_z = Some(vertex_z);
        self
    }

    #[must_use]
    pub fn with_manual_elevation(mut self, value: Option<f64>) -> Self {
        self.manual_elevation = value;
        self
    }

    #[must_use]
    pub fn with_declared_speed(mut self, value: Option<f64>) -> Self {
        self.declared_speed = value;
        self
    }

    /// Planar length of the polyline, never negative
    pub fn length(&self) -> f64 {
        Euclidean.length(&self.geometry)
    }

    pub fn start_point(&self) -> Option<Point<f64>> {
        self.geometry.points().next()
    }

    pub fn end_point(&self) -> Option<Point<f64>> {
        self.geometry.points().last()
    }

    /// Z difference between the first and last vertex of a 3D input
    pub fn z_delta(&self) -> Option<f64> {
        let z = self.vertex_z.as_ref()?;
        let (first, last) = (z.first()?, z.last()?);
        (first.is_finite() && last.is_finite()).then(|| (first - last).abs())
    }
}

/// Graph node: a distinct edge endpoint
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub geometry: Point<f64>,
}

/// Graph edge carrying the derived traversal weights
#[derive(Debug, Clone)]
pub struct WeightedEdge {
    /// Id of the [`NetworkEdge`] this edge was derived from
    pub source_id: u64,
    pub geometry: LineString<f64>,
    pub length: f64,
    /// Elevation difference used for the slope penalty
    pub delta_h: f64,
    /// `length + k * delta_h`, in metre-equivalents
    pub cost: f64,
    /// Speed in km/h used by the time strategy
    pub effective_speed: f64,
}

impl WeightedEdge {
    /// Edge weight under the given strategy
    ///
    /// Distance strategy uses the cost directly, time strategy uses the
    /// traversal time in seconds at the effective speed.
    pub fn weight(&self, strategy: TravelStrategy) -> f64 {
        match strategy {
            TravelStrategy::Distance => self.cost,
            TravelStrategy::Time => {
                if self.length <= 0.0 {
                    0.0
                } else {
                    self.length / (self.effective_speed / 3.6)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;

    #[test]
    fn length_is_planar() {
        let edge = NetworkEdge::new(1, line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 10.0)]);
        assert!((edge.length() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn z_delta_uses_end_vertices() {
        let edge = NetworkEdge::new(1, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)])
            .with_vertex_z(vec![120.0, 500.0, 100.0]);
        assert_eq!(edge.z_delta(), Some(20.0));
        assert_eq!(NetworkEdge::new(2, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]).z_delta(), None);
    }

    #[test]
    fn time_weight_is_seconds() {
        let edge = WeightedEdge {
            source_id: 1,
            geometry: line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)],
            length: 100.0,
            delta_h: 0.0,
            cost: 100.0,
            effective_speed: 3.6,
        };
        assert!((edge.weight(TravelStrategy::Time) - 100.0).abs() < 1e-9);
        assert!((edge.weight(TravelStrategy::Distance) - 100.0).abs() < 1e-9);
    }
}
