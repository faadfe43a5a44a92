//! Request bodies and their validation.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use safeguard_lib::Coordinate;

use crate::problem::{from_lib_error, ProblemDetails};

/// Trait for validating request parameters.
pub trait Validate {
    /// Validate the request. `request_id` fills the `instance` field of the
    /// returned problem.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/safe-points/sorted`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SortedRoutesRequest {
    pub lat: f64,
    pub lng: f64,
}

impl SortedRoutesRequest {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

impl Validate for SortedRoutesRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        Coordinate::checked(self.lat, self.lng)
            .map(|_| ())
            .map_err(|error| Box::new(from_lib_error(&error, request_id)))
    }
}

/// Generate a request identifier for log correlation.
pub fn generate_request_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("req-{timestamp:x}")
}
