//! SafeGuard library entry points.
//!
//! This crate models a street network with real and hazard-aware edge costs,
//! penalises the surroundings of active emergencies, and ranks nearby
//! hospitals and shelters by how safely they can be reached. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod cost;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod hazard;
pub mod network;
pub mod path;
pub mod prefilter;
pub mod routing;
pub mod spatial;
pub mod store;

pub use cost::{CostFunction, HazardAwareCost, RealCost};
pub use dataset::{load_network, network_path, parse_network, resolve_data_dir};
pub use error::{Error, Result};
pub use geo::Coordinate;
pub use hazard::{
    apply_hazard_zones, blast_radius, Hazard, HazardCategory, HazardPolicy, HazardReport, HazardZone,
};
pub use network::{Edge, EdgeIndex, EdgeKey, NetworkBuilder, Node, NodeId, RoadNetwork, NO_EDGE_COST};
pub use path::{bidirectional_distance, dijkstra_distance};
pub use prefilter::select_candidates;
pub use routing::{
    select_search, BidirectionalSearch, CandidateFailurePolicy, DijkstraSearch, PathSearch,
    RankingOrder, RouteResult, RoutingConfig, SafeRouteEngine, SafeRoutePlan, SearchAlgorithm,
    SearchTimings,
};
pub use spatial::{NodeLocator, SpatialIndex};
pub use store::{HazardSource, JsonStore, MemoryStore, SafePoint, SafePointSource};
