//! Hazard records and the blast-radius weight penalty.
//!
//! Applying hazards is a full recomputation: effective costs are reset to the
//! real costs first, then every edge incident to the two-hop neighbourhood of
//! each blocking hazard is set to `real_cost * penalty_factor`. Running the
//! same hazard set twice therefore yields identical weights.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geo::Coordinate;
use crate::network::{NodeId, RoadNetwork};
use crate::spatial::NodeLocator;

/// Default multiplier applied to edges inside a blast radius.
pub const DEFAULT_PENALTY_FACTOR: f64 = 100_000.0;

/// Largest accepted penalty factor. Penalised street lengths stay finite and
/// well below [`crate::network::NO_EDGE_COST`].
pub const MAX_PENALTY_FACTOR: f64 = 1e9;

/// Kind of emergency reported for a hazard.
///
/// Parsing is case-insensitive and also accepts the Italian labels stored by
/// the field reporting app.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HazardCategory {
    Earthquake,
    Fire,
    Tsunami,
    Flood,
    Explosion,
    Other(String),
}

impl HazardCategory {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "earthquake" | "terremoto" => Self::Earthquake,
            "fire" | "incendio" => Self::Fire,
            "tsunami" => Self::Tsunami,
            "flood" | "alluvione" => Self::Flood,
            "explosion" | "bomb" | "bomba" => Self::Explosion,
            _ => Self::Other(normalized),
        }
    }

    /// Categories that close roads unless configured otherwise.
    pub fn default_blocking() -> BTreeSet<HazardCategory> {
        BTreeSet::from([
            Self::Earthquake,
            Self::Fire,
            Self::Tsunami,
            Self::Flood,
            Self::Explosion,
        ])
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Fire => "fire",
            Self::Tsunami => "tsunami",
            Self::Flood => "flood",
            Self::Explosion => "explosion",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HazardCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HazardCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// An emergency reported at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: String,
    pub category: HazardCategory,
    pub active: bool,
    /// `None` when the report carried no usable position.
    pub coordinate: Option<Coordinate>,
}

/// Result of penalising the network for one hazard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardZone {
    pub hazard: Hazard,
    pub blocking: bool,
    /// Node the hazard was snapped to, when it blocks and resolution succeeded.
    pub center: Option<NodeId>,
    /// Number of nodes inside the blast radius.
    pub blocked_nodes: usize,
}

/// Summary of one hazard application pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HazardReport {
    /// Every hazard handed to the applier, blocking or not, in input order.
    pub zones: Vec<HazardZone>,
    /// Distinct nodes blocked across all hazards.
    pub blocked_nodes: usize,
    /// Distinct edges whose effective cost was penalised.
    pub penalized_edges: usize,
}

impl HazardReport {
    pub fn hazards(&self) -> impl Iterator<Item = &Hazard> {
        self.zones.iter().map(|zone| &zone.hazard)
    }
}

/// Settings for [`apply_hazard_zones`].
#[derive(Debug, Clone, PartialEq)]
pub struct HazardPolicy {
    pub blocking_categories: BTreeSet<HazardCategory>,
    pub penalty_factor: f64,
}

impl Default for HazardPolicy {
    fn default() -> Self {
        Self {
            blocking_categories: HazardCategory::default_blocking(),
            penalty_factor: DEFAULT_PENALTY_FACTOR,
        }
    }
}

impl HazardPolicy {
    /// Whether a hazard mutates the graph.
    pub fn is_blocking(&self, hazard: &Hazard) -> bool {
        hazard.active && self.blocking_categories.contains(&hazard.category)
    }
}

/// Two-hop closure around `center`: the node, its neighbours and theirs.
pub fn blast_radius(network: &RoadNetwork, center: NodeId) -> HashSet<NodeId> {
    let mut blocked = HashSet::from([center]);
    for &first in network.neighbours(center) {
        blocked.insert(first);
        blocked.extend(network.neighbours(first).iter().copied());
    }
    blocked
}

/// Reset the network's weights and penalise the blast radius of every
/// active blocking hazard.
///
/// A hazard that cannot be snapped to a node is logged and skipped; the
/// remaining hazards are still applied.
pub fn apply_hazard_zones(
    network: &mut RoadNetwork,
    hazards: &[Hazard],
    locator: &dyn NodeLocator,
    policy: &HazardPolicy,
) -> HazardReport {
    network.reset_weights();

    let mut all_blocked: HashSet<NodeId> = HashSet::new();
    let mut penalized: HashSet<usize> = HashSet::new();
    let mut zones = Vec::with_capacity(hazards.len());

    for hazard in hazards {
        let blocking = policy.is_blocking(hazard);
        let mut zone = HazardZone {
            hazard: hazard.clone(),
            blocking,
            center: None,
            blocked_nodes: 0,
        };

        if blocking {
            match resolve_center(hazard, locator) {
                Ok(center) => {
                    let blocked = blast_radius(network, center);
                    let edges: Vec<usize> = blocked
                        .iter()
                        .flat_map(|&node| network.incident_edges(node).iter().copied())
                        .collect();
                    for edge in edges {
                        if penalized.insert(edge) {
                            network.penalize_edge(edge, policy.penalty_factor);
                        }
                    }
                    debug!(
                        hazard = %hazard.id,
                        category = %hazard.category,
                        center,
                        blocked_nodes = blocked.len(),
                        "applied hazard zone"
                    );
                    zone.center = Some(center);
                    zone.blocked_nodes = blocked.len();
                    all_blocked.extend(blocked);
                }
                Err(reason) => {
                    warn!(hazard = %hazard.id, category = %hazard.category, %reason, "skipping hazard");
                }
            }
        }

        zones.push(zone);
    }

    info!(
        hazards = zones.len(),
        blocking = zones.iter().filter(|zone| zone.center.is_some()).count(),
        blocked_nodes = all_blocked.len(),
        penalized_edges = penalized.len(),
        "hazard zones applied"
    );

    HazardReport {
        zones,
        blocked_nodes: all_blocked.len(),
        penalized_edges: penalized.len(),
    }
}

fn resolve_center(hazard: &Hazard, locator: &dyn NodeLocator) -> Result<NodeId, String> {
    let coordinate = hazard
        .coordinate
        .ok_or_else(|| "hazard has no coordinate".to_string())?;
    locator
        .nearest_node(coordinate)
        .map_err(|error| error.to_string())
}
