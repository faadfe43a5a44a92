use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::cost::CostFunction;
use crate::network::{NodeId, RoadNetwork};

/// Run Dijkstra's algorithm from `source` and return the cost of the
/// cheapest path to `target`.
///
/// Returns `f64::INFINITY` when `target` cannot be reached or either node is
/// not part of the network.
pub fn dijkstra_distance<C>(network: &RoadNetwork, source: NodeId, target: NodeId, cost: &C) -> f64
where
    C: CostFunction + ?Sized,
{
    if !network.contains_node(source) || !network.contains_node(target) {
        return f64::INFINITY;
    }
    if source == target {
        return 0.0;
    }

    let mut frontier = Frontier::rooted_at(source);

    while let Some((node, distance)) = frontier.settle_next() {
        if node == target {
            return distance;
        }

        for &next in network.neighbours(node) {
            if frontier.settled.contains(&next) {
                continue;
            }
            let next_cost = distance + cost.cost(network, node, next);
            frontier.relax(next, next_cost);
        }
    }

    f64::INFINITY
}

/// Run a bidirectional Dijkstra search between `source` and `target`.
///
/// Two frontiers grow alternately from both ends. Whenever one of them scans
/// an edge into a node already settled by the other, the combined cost
/// becomes a candidate for the best meeting cost `mu`. The search stops once
/// the smallest keys of both queues sum to at least `mu`, since no path left
/// unexplored can be shorter.
///
/// The backward frontier walks edges in reverse, so `cost` must be symmetric
/// for the result to match [`dijkstra_distance`]; the hazard-aware cost used
/// by the engine is.
pub fn bidirectional_distance<C>(
    network: &RoadNetwork,
    source: NodeId,
    target: NodeId,
    cost: &C,
) -> f64
where
    C: CostFunction + ?Sized,
{
    if !network.contains_node(source) || !network.contains_node(target) {
        return f64::INFINITY;
    }
    if source == target {
        return 0.0;
    }

    let mut forward = Frontier::rooted_at(source);
    let mut backward = Frontier::rooted_at(target);
    let mut mu = f64::INFINITY;

    loop {
        let (Some(forward_min), Some(backward_min)) = (forward.min_key(), backward.min_key())
        else {
            break;
        };
        if forward_min + backward_min >= mu {
            break;
        }

        scan(network, cost, Direction::Forward, &mut forward, &backward, &mut mu);
        scan(network, cost, Direction::Backward, &mut backward, &forward, &mut mu);
    }

    mu
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Settle one node of `this` frontier and relax its edges.
fn scan<C>(
    network: &RoadNetwork,
    cost: &C,
    direction: Direction,
    this: &mut Frontier,
    other: &Frontier,
    mu: &mut f64,
) where
    C: CostFunction + ?Sized,
{
    let Some((node, distance)) = this.settle_next() else {
        return;
    };

    for &next in network.neighbours(node) {
        let weight = match direction {
            Direction::Forward => cost.cost(network, node, next),
            Direction::Backward => cost.cost(network, next, node),
        };
        let next_cost = distance + weight;
        this.relax(next, next_cost);

        if other.settled.contains(&next) {
            let through = next_cost + other.distance(next);
            if through < *mu {
                *mu = through;
            }
        }
    }
}

/// Tentative distances, settled set and priority queue of one search
/// direction.
#[derive(Debug, Default)]
struct Frontier {
    distances: HashMap<NodeId, f64>,
    settled: HashSet<NodeId>,
    queue: BinaryHeap<QueueEntry>,
}

impl Frontier {
    fn rooted_at(root: NodeId) -> Self {
        let mut frontier = Self::default();
        frontier.distances.insert(root, 0.0);
        frontier.queue.push(QueueEntry::new(root, 0.0));
        frontier
    }

    fn distance(&self, node: NodeId) -> f64 {
        self.distances.get(&node).copied().unwrap_or(f64::INFINITY)
    }

    fn relax(&mut self, node: NodeId, cost: f64) {
        if cost < self.distance(node) {
            self.distances.insert(node, cost);
            self.queue.push(QueueEntry::new(node, cost));
        }
    }

    /// Smallest key among entries whose node is still unsettled.
    fn min_key(&mut self) -> Option<f64> {
        while let Some(entry) = self.queue.peek() {
            if self.settled.contains(&entry.node) {
                self.queue.pop();
                continue;
            }
            return Some(entry.cost.0);
        }
        None
    }

    /// Pop the closest unsettled node and mark it settled.
    fn settle_next(&mut self) -> Option<(NodeId, f64)> {
        while let Some(entry) = self.queue.pop() {
            if self.settled.insert(entry.node) {
                return Some((entry.node, entry.cost.0));
            }
        }
        None
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
