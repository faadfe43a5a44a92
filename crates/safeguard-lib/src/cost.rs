//! Edge cost strategies consumed by the search algorithms.

use crate::network::{NodeId, RoadNetwork};

/// Cost of moving between two adjacent nodes.
///
/// Implementations must return finite, non-negative values; the search
/// algorithms rely on it for their settle order. Pairs without a connecting
/// edge should report [`crate::network::NO_EDGE_COST`] rather than fail.
pub trait CostFunction {
    fn cost(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> f64;
}

/// Physical road length, ignoring hazards.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCost;

impl CostFunction for RealCost {
    fn cost(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> f64 {
        network.real_cost_between(from, to)
    }
}

/// Effective cost after hazard penalties, reduced over parallel edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct HazardAwareCost;

impl CostFunction for HazardAwareCost {
    fn cost(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> f64 {
        network.effective_cost_between(from, to)
    }
}
