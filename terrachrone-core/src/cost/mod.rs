//! Edge cost model
//!
//! Turns edge geometry and elevation difference into a scalar cost
//! (`length + k * Δh`) and an equivalent speed used by the time strategy.

use log::debug;
use rayon::prelude::*;

use crate::model::{NetworkEdge, TravelMode, WeightedEdge, WeightedGraph};
use crate::terrain::elevation_delta;
use crate::{COST_EQUIVALENT_SPEED_KMH, SLOPE_PENALTY, SPEED_EPSILON};

/// How speeds are assigned to edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightingProfile {
    /// Every edge takes `3.6 * length / cost` km/h, so traversal seconds
    /// equal cost units
    CostEquivalent,
    /// Speeds follow the travel mode, declared per-edge speeds first
    Mode(TravelMode),
}

impl WeightingProfile {
    /// Whether edge costs depend on the elevation surface
    pub fn uses_elevation(&self) -> bool {
        match self {
            WeightingProfile::CostEquivalent => true,
            WeightingProfile::Mode(mode) => mode.is_slope_aware(),
        }
    }
}

/// Cost and speed derived for one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCost {
    pub delta_h: f64,
    pub cost: f64,
    pub effective_speed: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeCostModel {
    /// Cost units added per elevation unit
    pub penalty: f64,
    pub epsilon: f64,
}

impl Default for EdgeCostModel {
    fn default() -> Self {
        Self {
            penalty: SLOPE_PENALTY,
            epsilon: SPEED_EPSILON,
        }
    }
}

impl EdgeCostModel {
    /// `length + k * Δh`; negative or non-finite Δh contributes nothing
    pub fn cost(&self, length: f64, delta_h: f64) -> f64 {
        let delta_h = if delta_h.is_finite() { delta_h.max(0.0) } else { 0.0 };
        length.max(0.0) + self.penalty * delta_h
    }

    /// `reference * length / (cost + ε)`, or the reference speed itself for
    /// zero-length edges so the result stays positive
    pub fn effective_speed(&self, length: f64, cost: f64, reference_kmh: f64) -> f64 {
        if length <= 0.0 {
            reference_kmh
        } else {
            reference_kmh * length / (cost + self.epsilon)
        }
    }

    pub fn compute(&self, edge: &NetworkEdge, profile: WeightingProfile) -> EdgeCost {
        let length = edge.length();

        match profile {
            WeightingProfile::CostEquivalent => {
                let delta_h = elevation_delta(edge);
                let cost = self.cost(length, delta_h);
                EdgeCost {
                    delta_h,
                    cost,
                    effective_speed: self.effective_speed(length, cost, COST_EQUIVALENT_SPEED_KMH),
                }
            }
            WeightingProfile::Mode(mode) => {
                if let Some(declared) = valid_speed(edge.declared_speed) {
                    return EdgeCost {
                        delta_h: 0.0,
                        cost: length,
                        effective_speed: declared,
                    };
                }
                let default_speed = mode.default_speed_kmh();
                if mode.is_slope_aware() {
                    let delta_h = elevation_delta(edge);
                    let cost = self.cost(length, delta_h);
                    EdgeCost {
                        delta_h,
                        cost,
                        effective_speed: self.effective_speed(length, cost, default_speed),
                    }
                } else {
                    EdgeCost {
                        delta_h: 0.0,
                        cost: length,
                        effective_speed: default_speed,
                    }
                }
            }
        }
    }

    pub fn weigh(&self, edge: &NetworkEdge, profile: WeightingProfile) -> WeightedEdge {
        let EdgeCost {
            delta_h,
            cost,
            effective_speed,
        } = self.compute(edge, profile);
        WeightedEdge {
            source_id: edge.id,
            geometry: edge.geometry.clone(),
            length: edge.length(),
            delta_h,
            cost,
            effective_speed,
        }
    }

    /// Weigh every edge and assemble the graph
    pub fn build_graph(&self, edges: &[NetworkEdge], profile: WeightingProfile) -> WeightedGraph {
        let weighted: Vec<WeightedEdge> = edges.par_iter().map(|e| self.weigh(e, profile)).collect();
        debug!("Weighted {} edges with profile {profile:?}", weighted.len());
        WeightedGraph::from_edges(weighted)
    }
}

fn valid_speed(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
