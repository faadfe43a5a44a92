use std::path::PathBuf;

use thiserror::Error;

use crate::network::NodeId;

/// Convenient result alias for the SafeGuard library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// A missing path between two nodes is not an error: the search functions
/// report it as `f64::INFINITY`.
#[derive(Debug, Error)]
pub enum Error {
    /// Network file could not be located at the resolved path.
    #[error("road network not found at {path}")]
    NetworkNotFound { path: PathBuf },

    /// Raised when the network file is structurally invalid.
    #[error("invalid road network: {message}")]
    InvalidNetwork { message: String },

    /// Raised when a node identifier is not part of the loaded network.
    #[error("unknown node {node}")]
    UnknownNode { node: NodeId },

    /// Raised when a coordinate cannot be snapped to a graph node.
    #[error("no graph node near ({lat}, {lng}): {reason}")]
    GeocodeResolution { lat: f64, lng: f64, reason: String },

    /// Raised when the hazard or safe point store cannot be read.
    #[error("upstream data source {source_name} unavailable: {message}")]
    UpstreamUnavailable { source_name: String, message: String },

    /// Raised when a coordinate lies outside the valid WGS84 range.
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the data directory")]
    ProjectDirsUnavailable,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
