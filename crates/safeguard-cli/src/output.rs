//! Rendering of command results as text or JSON.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use safeguard_lib::{Coordinate, HazardReport, NodeId, RouteResult, SafeRoutePlan, SearchAlgorithm};

use crate::terminal::{format_distance, ColorPalette};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Result of the `distance` command.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceReport {
    pub from: NodeId,
    pub to: NodeId,
    pub algorithm: SearchAlgorithm,
    pub hazard_aware: bool,
    /// `None` when the nodes are not connected.
    pub distance: Option<f64>,
}

/// Result of the `nearest` command.
#[derive(Debug, Clone, Serialize)]
pub struct NearestReport {
    pub query: Coordinate,
    pub node: NodeId,
    pub position: Coordinate,
    /// Great-circle distance from the query to the node, in metres.
    pub distance_m: f64,
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Render a routing plan.
pub fn render_plan<W: Write>(
    out: &mut W,
    plan: &SafeRoutePlan,
    user: Coordinate,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, plan);
    }

    let p = palette;
    writeln!(
        out,
        "Safe destinations near {:.5}, {:.5} {}(node {}){}",
        user.lat, user.lng, p.gray, plan.user_node, p.reset
    )?;
    writeln!(
        out,
        "{}{} active hazard(s), {} blocked node(s){}",
        p.gray,
        plan.hazards.len(),
        plan.blocked_nodes,
        p.reset
    )?;

    if plan.routes.is_empty() {
        writeln!(out, "No safe destinations found.")?;
        return Ok(());
    }

    writeln!(out)?;
    for (rank, route) in plan.routes.iter().enumerate() {
        render_route_line(out, rank + 1, route, p)?;
    }
    Ok(())
}

fn render_route_line<W: Write>(
    out: &mut W,
    rank: usize,
    route: &RouteResult,
    p: &ColorPalette,
) -> io::Result<()> {
    let (tag, color) = if route.blocked {
        ("BLOCKED", p.tag_blocked)
    } else if route.dangerous {
        ("DANGER", p.tag_danger)
    } else {
        ("SAFE", p.tag_safe)
    };

    write!(
        out,
        "{rank:>3}  {color}{tag:<7}{reset}  {bold}{name}{reset} {gray}[{category}]{reset}  {cyan}{distance}{reset}",
        reset = p.reset,
        bold = p.white_bold,
        gray = p.gray,
        cyan = p.cyan,
        name = route.destination.name,
        category = route.destination.category,
        distance = format_distance(route.reported_distance),
    )?;
    if route.dangerous && route.real_distance != route.reported_distance {
        write!(
            out,
            " {}(direct {}){}",
            p.gray,
            format_distance(route.real_distance),
            p.reset
        )?;
    }
    writeln!(out)
}

/// Render the outcome of applying hazards.
pub fn render_hazards<W: Write>(
    out: &mut W,
    report: &HazardReport,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    let p = palette;
    if report.zones.is_empty() {
        writeln!(out, "No active hazards.")?;
        return Ok(());
    }

    for zone in &report.zones {
        let effect = match (zone.blocking, zone.center) {
            (true, Some(center)) => format!(
                "{}blocking{} around node {center}, {} node(s)",
                p.red, p.reset, zone.blocked_nodes
            ),
            (true, None) => format!("{}blocking{}, position unresolved", p.red, p.reset),
            (false, _) => "informational".to_string(),
        };
        writeln!(
            out,
            "{}{}{} {}({}){}  {effect}",
            p.white_bold, zone.hazard.id, p.reset, p.gray, zone.hazard.category, p.reset
        )?;
    }
    writeln!(
        out,
        "{}{} blocked node(s), {} penalised edge(s){}",
        p.gray, report.blocked_nodes, report.penalized_edges, p.reset
    )
}

/// Render a node-to-node distance.
pub fn render_distance<W: Write>(
    out: &mut W,
    report: &DistanceReport,
    format: OutputFormat,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    let cost = if report.hazard_aware {
        "hazard-aware"
    } else {
        "real"
    };
    match report.distance {
        Some(distance) => writeln!(
            out,
            "{} -> {} ({}, {cost}): {}",
            report.from,
            report.to,
            report.algorithm,
            format_distance(distance)
        ),
        None => writeln!(
            out,
            "{} -> {} ({}, {cost}): unreachable",
            report.from, report.to, report.algorithm
        ),
    }
}

/// Render the node a coordinate snaps to.
pub fn render_nearest<W: Write>(
    out: &mut W,
    report: &NearestReport,
    format: OutputFormat,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    writeln!(
        out,
        "node {} at {:.6}, {:.6} ({} away)",
        report.node,
        report.position.lat,
        report.position.lng,
        format_distance(report.distance_m)
    )
}
