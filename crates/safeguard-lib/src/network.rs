//! Weighted multigraph of the street network.
//!
//! The topology (nodes, edges, real costs and the lookup tables derived from
//! them) is immutable and shared behind an [`Arc`]. Each [`RoadNetwork`] value
//! owns its own vector of effective costs, so cloning a network is the
//! per-request weight overlay: the clone can be reset and penalised without
//! touching any other request's view.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Identifier of a graph node (OSM node ids fit in an `i64`).
pub type NodeId = i64;

/// Disambiguates parallel edges between the same ordered node pair.
pub type EdgeKey = u32;

/// Position of an edge inside [`RoadNetwork::edges`].
pub type EdgeIndex = usize;

/// Cost reported between two nodes that share no edge.
///
/// Large enough to never win a comparison against a real route, small enough
/// that adding a handful of them stays finite.
pub const NO_EDGE_COST: f64 = 1e18;

/// Graph node with its geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coordinate: Coordinate,
}

/// Directed edge between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub key: EdgeKey,
    /// Physical length; never changes after load.
    pub real_cost: f64,
}

impl Edge {
    /// Whether `node` is one of the edge's endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

#[derive(Debug, Default)]
struct Topology {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    neighbours: HashMap<NodeId, Vec<NodeId>>,
    incident: HashMap<NodeId, Vec<EdgeIndex>>,
    links: HashMap<(NodeId, NodeId), Vec<EdgeIndex>>,
}

/// Street network with immutable real costs and mutable effective costs.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    topology: Arc<Topology>,
    effective: Vec<f64>,
}

impl RoadNetwork {
    /// Start building a network.
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    pub fn node_count(&self) -> usize {
        self.topology.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.topology.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topology.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.topology.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.topology.nodes.contains_key(&id)
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.topology.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.topology.edges
    }

    pub fn edge(&self, index: EdgeIndex) -> Option<&Edge> {
        self.topology.edges.get(index)
    }

    /// Current effective cost of an edge.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn effective_cost(&self, index: EdgeIndex) -> f64 {
        self.effective[index]
    }

    /// Restore every effective cost to the edge's real cost.
    pub fn reset_weights(&mut self) {
        self.effective.clear();
        self.effective
            .extend(self.topology.edges.iter().map(|edge| edge.real_cost));
    }

    /// Set an edge's effective cost to `real_cost * factor`.
    ///
    /// This is an assignment, so penalising the same edge twice with the same
    /// factor leaves it unchanged. Factors below one are clamped to one so the
    /// effective cost never drops under the real cost.
    pub fn penalize_edge(&mut self, index: EdgeIndex, factor: f64) {
        let Some(edge) = self.topology.edges.get(index) else {
            return;
        };
        self.effective[index] = edge.real_cost * factor.max(1.0);
    }

    /// Nodes adjacent to `node` in either direction, sorted and deduplicated.
    pub fn neighbours(&self, node: NodeId) -> &[NodeId] {
        self.topology
            .neighbours
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Edges that have `node` as source or target.
    pub fn incident_edges(&self, node: NodeId) -> &[EdgeIndex] {
        self.topology
            .incident
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All parallel edges connecting `u` and `v`, in either direction.
    pub fn edges_between(&self, u: NodeId, v: NodeId) -> &[EdgeIndex] {
        self.topology
            .links
            .get(&link_key(u, v))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Minimum effective cost over all edges joining `u` and `v`.
    ///
    /// Returns [`NO_EDGE_COST`] when the two nodes are not adjacent.
    pub fn effective_cost_between(&self, u: NodeId, v: NodeId) -> f64 {
        self.reduce_between(u, v, |index| self.effective[index])
    }

    /// Minimum real cost over all edges joining `u` and `v`.
    ///
    /// Returns [`NO_EDGE_COST`] when the two nodes are not adjacent.
    pub fn real_cost_between(&self, u: NodeId, v: NodeId) -> f64 {
        self.reduce_between(u, v, |index| self.topology.edges[index].real_cost)
    }

    fn reduce_between(&self, u: NodeId, v: NodeId, cost: impl Fn(EdgeIndex) -> f64) -> f64 {
        self.edges_between(u, v)
            .iter()
            .map(|&index| cost(index))
            .fold(NO_EDGE_COST, f64::min)
    }
}

fn link_key(u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Incrementally assembles a [`RoadNetwork`], validating as it goes.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    keys: HashMap<(NodeId, NodeId), Vec<EdgeKey>>,
}

impl NetworkBuilder {
    /// Add a node. Duplicate identifiers are rejected.
    pub fn add_node(&mut self, id: NodeId, coordinate: Coordinate) -> Result<&mut Self> {
        if self.nodes.contains_key(&id) {
            return Err(Error::InvalidNetwork {
                message: format!("duplicate node id {id}"),
            });
        }
        self.nodes.insert(id, Node { id, coordinate });
        Ok(self)
    }

    /// Add an edge with the next free key for the `(source, target)` pair.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, real_cost: f64) -> Result<EdgeIndex> {
        let key = self
            .keys
            .get(&(source, target))
            .and_then(|keys| keys.iter().max())
            .map_or(0, |max| max + 1);
        self.add_keyed_edge(source, target, key, real_cost)
    }

    /// Add an edge with an explicit key.
    pub fn add_keyed_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        key: EdgeKey,
        real_cost: f64,
    ) -> Result<EdgeIndex> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(Error::InvalidNetwork {
                    message: format!("edge {source}->{target} references unknown node {endpoint}"),
                });
            }
        }

        if !real_cost.is_finite() || real_cost < 0.0 {
            return Err(Error::InvalidNetwork {
                message: format!("edge {source}->{target} has invalid cost {real_cost}"),
            });
        }

        let keys = self.keys.entry((source, target)).or_default();
        if keys.contains(&key) {
            return Err(Error::InvalidNetwork {
                message: format!("duplicate edge {source}->{target} with key {key}"),
            });
        }
        keys.push(key);

        self.edges.push(Edge {
            source,
            target,
            key,
            real_cost,
        });
        Ok(self.edges.len() - 1)
    }

    /// Coordinate of an already added node.
    pub fn coordinate(&self, id: NodeId) -> Option<Coordinate> {
        self.nodes.get(&id).map(|node| node.coordinate)
    }

    /// Finish building; effective costs start equal to real costs.
    pub fn build(self) -> RoadNetwork {
        let mut neighbours: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut incident: HashMap<NodeId, Vec<EdgeIndex>> = HashMap::new();
        let mut links: HashMap<(NodeId, NodeId), Vec<EdgeIndex>> = HashMap::new();

        for &id in self.nodes.keys() {
            neighbours.entry(id).or_default();
            incident.entry(id).or_default();
        }

        for (index, edge) in self.edges.iter().enumerate() {
            links
                .entry(link_key(edge.source, edge.target))
                .or_default()
                .push(index);

            incident.entry(edge.source).or_default().push(index);
            if edge.target != edge.source {
                incident.entry(edge.target).or_default().push(index);
                neighbours.entry(edge.source).or_default().push(edge.target);
                neighbours.entry(edge.target).or_default().push(edge.source);
            }
        }

        for adjacent in neighbours.values_mut() {
            adjacent.sort_unstable();
            adjacent.dedup();
        }

        let effective = self.edges.iter().map(|edge| edge.real_cost).collect();
        RoadNetwork {
            topology: Arc::new(Topology {
                nodes: self.nodes,
                edges: self.edges,
                neighbours,
                incident,
                links,
            }),
            effective,
        }
    }
}
