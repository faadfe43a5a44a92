use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::network::{EdgeKey, NodeId, RoadNetwork};

/// Default filename of the street network inside a data directory.
pub const NETWORK_FILENAME: &str = "network.json";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SAFEGUARD_DATA_DIR";

/// Resolve the default data directory using platform-specific project directories.
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "safeguard", "safeguard").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Resolve the data directory.
///
/// The resolution order is:
/// 1. Explicit `target` argument when provided.
/// 2. `SAFEGUARD_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
pub fn resolve_data_dir(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(explicit.to_path_buf());
    }

    if let Some(env_path) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(env_path));
    }

    default_data_dir()
}

/// Path of the network file for a data directory, or the path itself when it
/// already names a file.
pub fn network_path(data: &Path) -> PathBuf {
    if data.extension().is_some() {
        data.to_path_buf()
    } else {
        data.join(NETWORK_FILENAME)
    }
}

#[derive(Debug, Deserialize)]
struct NetworkFile {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: NodeId,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    u: NodeId,
    v: NodeId,
    #[serde(default)]
    key: Option<EdgeKey>,
    /// Length in metres; derived from the endpoint positions when absent.
    #[serde(default)]
    length: Option<f64>,
}

/// Load a street network from a JSON file.
pub fn load_network(path: &Path) -> Result<RoadNetwork> {
    if !path.exists() {
        return Err(Error::NetworkNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "reading road network");
    let contents = fs::read_to_string(path)?;
    let network = parse_network(&contents)?;

    info!(
        path = %path.display(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        "loaded road network"
    );
    Ok(network)
}

/// Parse the JSON network representation.
pub fn parse_network(contents: &str) -> Result<RoadNetwork> {
    let file: NetworkFile = serde_json::from_str(contents)?;
    let mut builder = RoadNetwork::builder();

    for node in file.nodes {
        let coordinate =
            Coordinate::checked(node.lat, node.lng).map_err(|_| Error::InvalidNetwork {
                message: format!("node {} has invalid position ({}, {})", node.id, node.lat, node.lng),
            })?;
        builder.add_node(node.id, coordinate)?;
    }

    for edge in file.edges {
        let length = match edge.length {
            Some(length) => length,
            None => {
                let (Some(from), Some(to)) = (builder.coordinate(edge.u), builder.coordinate(edge.v))
                else {
                    return Err(Error::InvalidNetwork {
                        message: format!("edge {}->{} references an unknown node", edge.u, edge.v),
                    });
                };
                from.haversine_distance(&to)
            }
        };

        match edge.key {
            Some(key) => builder.add_keyed_edge(edge.u, edge.v, key, length)?,
            None => builder.add_edge(edge.u, edge.v, length)?,
        };
    }

    Ok(builder.build())
}
