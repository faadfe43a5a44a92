//! The safe-points endpoint and the router.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use safeguard_lib::RouteResult;

use crate::health::{health_live, health_ready};
use crate::problem::ProblemDetails;
use crate::request::{generate_request_id, SortedRoutesRequest, Validate};
use crate::state::AppState;

/// One ranked destination as returned to the map front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafePointRoute {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
    /// Distance used for ranking, in metres.
    pub distance: f64,
    /// Hazard-free road distance, in metres.
    pub dist_real: f64,
    #[serde(rename = "isDangerous")]
    pub is_dangerous: bool,
    #[serde(rename = "isBlocked")]
    pub is_blocked: bool,
}

impl From<&RouteResult> for SafePointRoute {
    fn from(route: &RouteResult) -> Self {
        Self {
            title: route.destination.name.clone(),
            kind: route.destination.category.clone(),
            lat: route.destination.coordinate.lat,
            lng: route.destination.coordinate.lng,
            distance: route.reported_distance,
            dist_real: route.real_distance,
            is_dangerous: route.dangerous,
            is_blocked: route.blocked,
        }
    }
}

/// Build the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/safe-points/sorted", post(sorted_routes_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle `POST /api/safe-points/sorted`.
///
/// Invalid bodies get a 400 problem document. Once the position is valid,
/// failures in the data sources or the routing degrade to an empty list.
pub async fn sorted_routes_handler(
    State(state): State<AppState>,
    body: Result<Json<SortedRoutesRequest>, JsonRejection>,
) -> Response {
    let request_id = generate_request_id();

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            info!(request_id = %request_id, error = %rejection.body_text(), "rejected request body");
            return ProblemDetails::bad_request(rejection.body_text(), request_id).into_response();
        }
    };

    if let Err(problem) = request.validate(&request_id) {
        return (*problem).into_response();
    }

    info!(
        request_id = %request_id,
        lat = request.lat,
        lng = request.lng,
        "handling sorted safe points request"
    );

    let worker_state = state.clone();
    let computed = tokio::task::spawn_blocking(move || {
        worker_state.engine().compute_sorted_routes(
            request.coordinate(),
            worker_state.hazards(),
            worker_state.safe_points(),
        )
    })
    .await;

    let routes: Vec<SafePointRoute> = match computed {
        Ok(routes) => routes.iter().map(SafePointRoute::from).collect(),
        Err(join_error) => {
            error!(request_id = %request_id, error = %join_error, "routing task failed");
            Vec::new()
        }
    };

    (StatusCode::OK, Json(routes)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeguard_lib::{Coordinate, SafePoint};

    #[test]
    fn route_serializes_with_front_end_field_names() {
        let route = RouteResult {
            destination: SafePoint {
                id: "ruggi".to_string(),
                name: "Ospedale Ruggi".to_string(),
                category: "hospitals".to_string(),
                coordinate: Coordinate::new(40.674, 14.758),
            },
            reported_distance: 999_999.0,
            real_distance: 1_119.6,
            hazard_distance: 999_999.0,
            dangerous: true,
            blocked: true,
            timings: None,
        };

        let value = serde_json::to_value(SafePointRoute::from(&route)).unwrap();
        assert_eq!(value["title"], "Ospedale Ruggi");
        assert_eq!(value["type"], "hospitals");
        assert_eq!(value["distance"], 999_999.0);
        assert_eq!(value["dist_real"], 1_119.6);
        assert_eq!(value["isDangerous"], true);
        assert_eq!(value["isBlocked"], true);
    }
}
