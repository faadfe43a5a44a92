mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use safeguard_cli::output::OutputFormat;
use safeguard_lib::{RankingOrder, SearchAlgorithm};

use commands::distance::DistanceArgs;
use commands::routes::RoutesArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hazard-aware routing to hospitals and shelters")]
struct Cli {
    /// Override the data directory (network, hazards and safe points).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the safe destinations nearest to a position.
    Routes {
        /// Latitude of the user position.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the user position.
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Number of destinations searched after the planar prefilter.
        #[arg(long)]
        candidates: Option<usize>,
        /// Extra distance a hazard detour may add before a route is dangerous.
        #[arg(long)]
        danger_margin: Option<f64>,
        /// Ordering of the results.
        #[arg(long, value_enum)]
        ranking: Option<RankingArg>,
        /// Leave unreachable destinations out instead of reporting them blocked.
        #[arg(long)]
        drop_failed: bool,
    },
    /// List active hazards and the part of the network they block.
    Hazards,
    /// Distance between two network nodes.
    Distance {
        /// Source node id.
        #[arg(long = "from")]
        from: i64,
        /// Target node id.
        #[arg(long = "to")]
        to: i64,
        /// Search algorithm.
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Dijkstra)]
        algorithm: AlgorithmArg,
        /// Apply active hazards and measure hazard-aware cost.
        #[arg(long)]
        hazard_aware: bool,
    },
    /// Snap a position to the nearest network node.
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RankingArg {
    Distance,
    SafetyFirst,
}

impl From<RankingArg> for RankingOrder {
    fn from(value: RankingArg) -> Self {
        match value {
            RankingArg::Distance => RankingOrder::Distance,
            RankingArg::SafetyFirst => RankingOrder::SafetyFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Dijkstra,
    Bidirectional,
}

impl From<AlgorithmArg> for SearchAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Dijkstra => SearchAlgorithm::Dijkstra,
            AlgorithmArg::Bidirectional => SearchAlgorithm::Bidirectional,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = cli.data_dir.as_deref();
    match cli.command {
        Command::Routes {
            lat,
            lng,
            candidates,
            danger_margin,
            ranking,
            drop_failed,
        } => commands::routes::handle_routes_command(
            data_dir,
            &RoutesArgs {
                lat,
                lng,
                candidates,
                danger_margin,
                ranking: ranking.map(Into::into),
                drop_failed,
            },
            cli.format,
        ),
        Command::Hazards => commands::hazards::handle_hazards_command(data_dir, cli.format),
        Command::Distance {
            from,
            to,
            algorithm,
            hazard_aware,
        } => commands::distance::handle_distance_command(
            data_dir,
            &DistanceArgs {
                from,
                to,
                algorithm: algorithm.into(),
                hazard_aware,
            },
            cli.format,
        ),
        Command::Nearest { lat, lng } => {
            commands::nearest::handle_nearest_command(data_dir, lat, lng, cli.format)
        }
    }
}

/// Log to stderr so stdout only carries command output. `RUST_LOG` wins
/// unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
