//! `nearest` command: snap a position onto the network.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use safeguard_cli::output::{render_nearest, NearestReport, OutputFormat};
use safeguard_lib::{Coordinate, Error as LibError, NodeLocator, SpatialIndex};

use super::load_data_set;

pub fn handle_nearest_command(
    target: Option<&Path>,
    lat: f64,
    lng: f64,
    format: OutputFormat,
) -> Result<()> {
    let query = Coordinate::checked(lat, lng).context("invalid position")?;
    let data = load_data_set(target)?;
    let index = SpatialIndex::build(&data.network);

    let node = index.nearest_node(query)?;
    let position = data
        .network
        .node(node)
        .map(|node| node.coordinate)
        .ok_or(LibError::UnknownNode { node })?;

    let report = NearestReport {
        query,
        node,
        position,
        distance_m: query.haversine_distance(&position),
    };

    let mut stdout = io::stdout().lock();
    render_nearest(&mut stdout, &report, format)?;
    Ok(())
}
