//! SafeGuard safe destination HTTP microservice.
//!
//! # Endpoints
//!
//! - `POST /api/safe-points/sorted` - Rank safe destinations around a position
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//!
//! # Configuration
//!
//! - `SAFEGUARD_DATA_DIR` - Directory holding `network.json` and the collections
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `SAFEGUARD_*` routing overrides, see `RoutingConfig::from_env`

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};

use safeguard_lib::{resolve_data_dir, RoutingConfig};
use safeguard_service::{build_router, init_logging, AppState, LoggingConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("safeguard");
    init_logging(&logging_config);

    let data_dir = resolve_data_dir(None)?;
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let config = RoutingConfig::from_env();

    info!(data_dir = %data_dir.display(), port = port, "starting safeguard service");

    let state = AppState::load(&data_dir, config).map_err(|e| {
        error!(error = %e, path = %data_dir.display(), "failed to load application state");
        e
    })?;

    info!(
        nodes = state.engine().network().node_count(),
        edges = state.engine().network().edge_count(),
        "application state loaded"
    );

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
