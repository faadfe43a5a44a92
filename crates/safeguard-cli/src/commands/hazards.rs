//! `hazards` command: show what the active hazards block.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use safeguard_cli::output::{render_hazards, OutputFormat};
use safeguard_cli::terminal::ColorPalette;
use safeguard_lib::{HazardSource, RoutingConfig, SafeRouteEngine};

use super::load_data_set;

pub fn handle_hazards_command(target: Option<&Path>, format: OutputFormat) -> Result<()> {
    let data = load_data_set(target)?;
    let hazards = data
        .store
        .active_hazards()
        .context("failed to read active hazards")?;

    let engine = SafeRouteEngine::with_spatial_index(data.network, RoutingConfig::from_env());
    let (_, report) = engine.apply_hazards(&hazards);

    let mut stdout = io::stdout().lock();
    render_hazards(&mut stdout, &report, format, &ColorPalette::detect())?;
    Ok(())
}
