//! Subcommand handlers. `main.rs` parses arguments and dispatches here.

pub mod distance;
pub mod hazards;
pub mod nearest;
pub mod routes;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use safeguard_lib::{load_network, network_path, resolve_data_dir, JsonStore, RoadNetwork};

/// Network and stores read from one data directory.
pub struct DataSet {
    pub network: RoadNetwork,
    pub store: JsonStore,
}

/// Resolve the data directory and load the network it holds.
///
/// `target` may name the directory or the network file inside it.
pub fn load_data_set(target: Option<&Path>) -> Result<DataSet> {
    let data_dir = resolve_data_dir(target).context("failed to resolve the data directory")?;
    let network_file = network_path(&data_dir);
    let network = load_network(&network_file)
        .with_context(|| format!("failed to load road network from {}", network_file.display()))?;

    let store_dir: PathBuf = if data_dir.is_dir() {
        data_dir
    } else {
        data_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };

    Ok(DataSet {
        network,
        store: JsonStore::new(store_dir),
    })
}
