//! `routes` command: rank safe destinations for a position.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use safeguard_cli::output::{render_plan, OutputFormat};
use safeguard_cli::terminal::ColorPalette;
use safeguard_lib::{CandidateFailurePolicy, Coordinate, RankingOrder, RoutingConfig, SafeRouteEngine};

use super::load_data_set;

/// Arguments for the routes command.
#[derive(Debug, Clone)]
pub struct RoutesArgs {
    pub lat: f64,
    pub lng: f64,
    pub candidates: Option<usize>,
    pub danger_margin: Option<f64>,
    pub ranking: Option<RankingOrder>,
    pub drop_failed: bool,
}

impl RoutesArgs {
    /// Environment configuration with the command-line overrides on top.
    pub fn to_config(&self) -> RoutingConfig {
        let mut config = RoutingConfig::from_env();
        if let Some(candidates) = self.candidates {
            config.candidate_count = candidates;
        }
        if let Some(margin) = self.danger_margin {
            config.danger_margin = margin;
        }
        if let Some(ranking) = self.ranking {
            config.ranking = ranking;
        }
        if self.drop_failed {
            config.on_candidate_failure = CandidateFailurePolicy::Drop;
        }
        config
    }
}

pub fn handle_routes_command(
    target: Option<&Path>,
    args: &RoutesArgs,
    format: OutputFormat,
) -> Result<()> {
    let user = Coordinate::checked(args.lat, args.lng).context("invalid user position")?;
    let data = load_data_set(target)?;
    let engine = SafeRouteEngine::with_spatial_index(data.network, args.to_config());

    let plan = engine
        .plan(user, &data.store, &data.store)
        .context("failed to compute safe routes")?;

    let mut stdout = io::stdout().lock();
    render_plan(&mut stdout, &plan, user, format, &ColorPalette::detect())?;
    Ok(())
}
