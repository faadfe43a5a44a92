//! `distance` command: shortest distance between two nodes.

use std::io;
use std::path::Path;

use anyhow::{bail, Context, Result};

use safeguard_cli::output::{render_distance, DistanceReport, OutputFormat};
use safeguard_lib::{
    select_search, CostFunction, HazardAwareCost, HazardSource, NodeId, RealCost, RoutingConfig,
    SafeRouteEngine, SearchAlgorithm,
};

use super::load_data_set;

/// Arguments for the distance command.
#[derive(Debug, Clone)]
pub struct DistanceArgs {
    pub from: NodeId,
    pub to: NodeId,
    pub algorithm: SearchAlgorithm,
    pub hazard_aware: bool,
}

pub fn handle_distance_command(
    target: Option<&Path>,
    args: &DistanceArgs,
    format: OutputFormat,
) -> Result<()> {
    let data = load_data_set(target)?;
    for node in [args.from, args.to] {
        if !data.network.contains_node(node) {
            bail!("node {node} is not part of the road network");
        }
    }

    let network = if args.hazard_aware {
        let hazards = data
            .store
            .active_hazards()
            .context("failed to read active hazards")?;
        let engine = SafeRouteEngine::with_spatial_index(data.network, RoutingConfig::from_env());
        let (overlay, _) = engine.apply_hazards(&hazards);
        overlay
    } else {
        data.network
    };

    let cost: &dyn CostFunction = if args.hazard_aware {
        &HazardAwareCost
    } else {
        &RealCost
    };
    let distance = select_search(args.algorithm).distance(&network, args.from, args.to, cost);

    let report = DistanceReport {
        from: args.from,
        to: args.to,
        algorithm: args.algorithm,
        hazard_aware: args.hazard_aware,
        distance: distance.is_finite().then_some(distance),
    };

    let mut stdout = io::stdout().lock();
    render_distance(&mut stdout, &report, format)?;
    Ok(())
}
