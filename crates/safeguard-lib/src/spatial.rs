//! KD-tree index for snapping coordinates onto the nearest graph node.
//!
//! Nodes are indexed as unit-sphere vectors, so the closest vector by chord
//! length is also the closest node by great-circle distance at any latitude.
//! An optional snap radius, checked with the haversine distance, rejects
//! points that are too far away from the network to be meaningful.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::info;

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::network::{NodeId, RoadNetwork};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Resolves a geographic coordinate to a node of the road network.
pub trait NodeLocator: Send + Sync {
    fn nearest_node(&self, coordinate: Coordinate) -> Result<NodeId>;
}

/// Precomputed nearest-node index over a [`RoadNetwork`].
pub struct SpatialIndex {
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
    nodes: Vec<(NodeId, Coordinate)>,
    max_snap_distance: Option<f64>,
}

impl SpatialIndex {
    /// Index every node of the network.
    pub fn build(network: &RoadNetwork) -> Self {
        let mut nodes: Vec<(NodeId, Coordinate)> = network
            .nodes()
            .map(|node| (node.id, node.coordinate))
            .collect();
        // Deterministic item order keeps tie-breaking stable between runs.
        nodes.sort_unstable_by_key(|(id, _)| *id);

        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (index, (_, coordinate)) in nodes.iter().enumerate() {
            tree.add(&coordinate.unit_vector(), index);
        }

        info!(node_count = nodes.len(), "built node spatial index");

        Self {
            tree,
            nodes,
            max_snap_distance: None,
        }
    }

    /// Reject snaps farther than `metres` from the query point.
    pub fn with_max_snap_distance(mut self, metres: f64) -> Self {
        self.max_snap_distance = Some(metres);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the `k` nodes closest to a coordinate, nearest first.
    pub fn nearest(&self, coordinate: Coordinate, k: usize) -> Vec<(NodeId, f64)> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        self.tree
            .nearest_n::<SquaredEuclidean>(&coordinate.unit_vector(), k)
            .into_iter()
            .map(|neighbour| {
                let (id, position) = self.nodes[neighbour.item];
                (id, coordinate.haversine_distance(&position))
            })
            .collect()
    }
}

impl NodeLocator for SpatialIndex {
    fn nearest_node(&self, coordinate: Coordinate) -> Result<NodeId> {
        if !coordinate.is_valid() {
            return Err(Error::GeocodeResolution {
                lat: coordinate.lat,
                lng: coordinate.lng,
                reason: "coordinate is not a valid WGS84 position".to_string(),
            });
        }

        let Some(&(node, metres)) = self.nearest(coordinate, 1).first() else {
            return Err(Error::GeocodeResolution {
                lat: coordinate.lat,
                lng: coordinate.lng,
                reason: "road network has no nodes".to_string(),
            });
        };

        if let Some(limit) = self.max_snap_distance {
            if metres > limit {
                return Err(Error::GeocodeResolution {
                    lat: coordinate.lat,
                    lng: coordinate.lng,
                    reason: format!("nearest node {node} is {metres:.0} m away (limit {limit:.0} m)"),
                });
            }
        }

        Ok(node)
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("node_count", &self.nodes.len())
            .field("max_snap_distance", &self.max_snap_distance)
            .finish()
    }
}
