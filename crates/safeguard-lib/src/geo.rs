//! Geographic coordinates and the two distance measures used by the engine.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lng: f64) -> Result<Self> {
        let coordinate = Self { lat, lng };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(Error::InvalidCoordinate { lat, lng })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Straight-line distance between raw degree values.
    ///
    /// Neither geodesic nor road distance; only meaningful for ranking
    /// nearby points against each other.
    pub fn planar_distance(&self, other: &Self) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    /// Great-circle distance in metres.
    pub fn haversine_distance(&self, other: &Self) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = (other.lat - self.lat).to_radians();
        let dlambda = (other.lng - self.lng).to_radians();

        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Position on the unit sphere. Chord length between two such vectors
    /// grows monotonically with the great-circle distance.
    pub(crate) fn unit_vector(&self) -> [f64; 3] {
        let phi = self.lat.to_radians();
        let lambda = self.lng.to_radians();
        [phi.cos() * lambda.cos(), phi.cos() * lambda.sin(), phi.sin()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_distance_uses_raw_degrees() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let a = Coordinate::new(40.0, 14.0);
        let b = Coordinate::new(41.0, 14.0);
        let metres = a.haversine_distance(&b);
        assert!((metres - 111_195.0).abs() < 50.0, "got {metres}");
    }

    #[test]
    fn unit_vectors_have_unit_length() {
        for coordinate in [Coordinate::new(40.67, 14.75), Coordinate::new(-33.9, 151.2)] {
            let [x, y, z] = coordinate.unit_vector();
            assert!(((x * x + y * y + z * z) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(Coordinate::checked(40.68, 14.77).is_ok());
        assert!(matches!(
            Coordinate::checked(95.0, 0.0),
            Err(Error::InvalidCoordinate { .. })
        ));
        assert!(Coordinate::checked(f64::NAN, 0.0).is_err());
    }
}
