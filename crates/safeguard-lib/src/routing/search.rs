//! Search strategies implementing the Strategy pattern.
//!
//! Both algorithms answer the same question (cheapest cost between two
//! nodes under a [`CostFunction`]) and can be swapped through
//! [`RoutingConfig`](super::RoutingConfig).

use crate::cost::CostFunction;
use crate::network::{NodeId, RoadNetwork};
use crate::path::{bidirectional_distance, dijkstra_distance};

use super::SearchAlgorithm;

/// Trait for shortest-distance strategies.
pub trait PathSearch: Send + Sync {
    /// The algorithm identifier for this strategy.
    fn algorithm(&self) -> SearchAlgorithm;

    /// Cost of the cheapest path, or `f64::INFINITY` when there is none.
    fn distance(
        &self,
        network: &RoadNetwork,
        source: NodeId,
        target: NodeId,
        cost: &dyn CostFunction,
    ) -> f64;
}

/// Single-direction Dijkstra search.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraSearch;

impl PathSearch for DijkstraSearch {
    fn algorithm(&self) -> SearchAlgorithm {
        SearchAlgorithm::Dijkstra
    }

    fn distance(
        &self,
        network: &RoadNetwork,
        source: NodeId,
        target: NodeId,
        cost: &dyn CostFunction,
    ) -> f64 {
        dijkstra_distance(network, source, target, cost)
    }
}

/// Meet-in-the-middle search from both endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidirectionalSearch;

impl PathSearch for BidirectionalSearch {
    fn algorithm(&self) -> SearchAlgorithm {
        SearchAlgorithm::Bidirectional
    }

    fn distance(
        &self,
        network: &RoadNetwork,
        source: NodeId,
        target: NodeId,
        cost: &dyn CostFunction,
    ) -> f64 {
        bidirectional_distance(network, source, target, cost)
    }
}

/// Select the strategy for an algorithm.
pub fn select_search(algorithm: SearchAlgorithm) -> &'static dyn PathSearch {
    match algorithm {
        SearchAlgorithm::Dijkstra => &DijkstraSearch,
        SearchAlgorithm::Bidirectional => &BidirectionalSearch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_search_returns_matching_strategy() {
        assert_eq!(
            select_search(SearchAlgorithm::Dijkstra).algorithm(),
            SearchAlgorithm::Dijkstra
        );
        assert_eq!(
            select_search(SearchAlgorithm::Bidirectional).algorithm(),
            SearchAlgorithm::Bidirectional
        );
    }
}
