#![allow(dead_code)]

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use safeguard_lib::{load_network, Coordinate, RoadNetwork, SafePoint};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_network() -> RoadNetwork {
    load_network(&fixtures_dir().join("network.json")).expect("fixture network loads")
}

/// Straight line `1 - 2 - 3 - 4 - 5` with unit costs, nodes spaced along the
/// equator.
pub fn line_network() -> RoadNetwork {
    let mut builder = RoadNetwork::builder();
    for id in 1..=5 {
        builder
            .add_node(id, line_position(id))
            .expect("unique node");
    }
    for id in 1..5 {
        builder.add_edge(id, id + 1, 1.0).expect("valid edge");
    }
    builder.build()
}

pub fn line_position(id: i64) -> Coordinate {
    Coordinate::new(0.0, 0.01 * id as f64)
}

pub fn safe_point(id: &str, coordinate: Coordinate) -> SafePoint {
    SafePoint {
        id: id.to_string(),
        name: id.to_string(),
        category: "safe_points".to_string(),
        coordinate,
    }
}

/// Random multigraph with `nodes` nodes and `edges` edges, integer costs in
/// `0..=20`. Self loops and parallel edges are allowed.
pub fn random_network(seed: u64, nodes: i64, edges: usize) -> RoadNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = RoadNetwork::builder();
    for id in 0..nodes {
        builder
            .add_node(id, Coordinate::new(0.0, id as f64 * 0.001))
            .expect("unique node");
    }
    for _ in 0..edges {
        let u = rng.random_range(0..nodes);
        let v = rng.random_range(0..nodes);
        let cost = rng.random_range(0..=20u32) as f64;
        builder.add_edge(u, v, cost).expect("valid edge");
    }
    builder.build()
}
