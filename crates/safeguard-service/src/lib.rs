//! HTTP glue for the SafeGuard routing engine.
//!
//! Handlers stay thin: parse the body, validate it, call
//! [`SafeRouteEngine`](safeguard_lib::SafeRouteEngine) and shape the response
//! for the mobile client. All routing logic lives in `safeguard-lib`.
//!
//! - [`AppState`]: pre-built engine plus the hazard and safe point sources
//! - [`health`]: liveness and readiness probes
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`logging`]: JSON or text `tracing` setup

#![deny(warnings)]

pub mod health;
pub mod logging;
mod problem;
mod request;
mod routes;
mod state;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use problem::{from_lib_error, ProblemDetails, PROBLEM_INVALID_REQUEST};
pub use request::{generate_request_id, SortedRoutesRequest, Validate};
pub use routes::{build_router, sorted_routes_handler, SafePointRoute};
pub use state::{AppState, AppStateError};
