//! Cheap narrowing of destinations before graph search.
//!
//! Candidates are ranked by planar distance between raw coordinates. The
//! road-nearest destinations may differ from the ones picked here; the
//! prefilter only bounds how many searches a request runs.

use crate::geo::Coordinate;
use crate::store::SafePoint;

/// Keep the `k` safe points closest to `origin` by planar distance.
///
/// Ties keep their input order. The result is sorted nearest first; points
/// without a usable position come last.
pub fn select_candidates(origin: Coordinate, points: &[SafePoint], k: usize) -> Vec<&SafePoint> {
    let mut ranked: Vec<(f64, &SafePoint)> = points
        .iter()
        .map(|point| (sortable(origin.planar_distance(&point.coordinate)), point))
        .collect();

    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked.truncate(k);
    ranked.into_iter().map(|(_, point)| point).collect()
}

/// NaN distances rank as infinitely far.
fn sortable(distance: f64) -> f64 {
    if distance.is_nan() {
        f64::INFINITY
    } else {
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, lat: f64, lng: f64) -> SafePoint {
        SafePoint {
            id: id.to_string(),
            name: id.to_string(),
            category: "hospitals".to_string(),
            coordinate: Coordinate::new(lat, lng),
        }
    }

    #[test]
    fn keeps_k_nearest_in_order() {
        let points = vec![
            point("far", 1.0, 1.0),
            point("near", 0.1, 0.0),
            point("mid", 0.0, 0.5),
        ];
        let selected = select_candidates(Coordinate::new(0.0, 0.0), &points, 2);
        let ids: Vec<&str> = selected.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
    }

    #[test]
    fn k_larger_than_input_returns_everything() {
        let points = vec![point("a", 0.0, 0.0)];
        assert_eq!(select_candidates(Coordinate::new(1.0, 1.0), &points, 5).len(), 1);
        assert!(select_candidates(Coordinate::new(1.0, 1.0), &points, 0).is_empty());
    }

    #[test]
    fn unplaceable_points_sort_last() {
        let points = vec![
            point("nan", f64::NAN, 0.0),
            point("far", 2.0, 2.0),
            point("near", 0.1, 0.1),
        ];
        let selected = select_candidates(Coordinate::new(0.0, 0.0), &points, 3);
        let ids: Vec<&str> = selected.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far", "nan"]);
    }

    #[test]
    fn ties_are_stable() {
        let points = vec![point("first", 0.0, 1.0), point("second", 1.0, 0.0)];
        let selected = select_candidates(Coordinate::new(0.0, 0.0), &points, 1);
        assert_eq!(selected[0].id, "first");
    }
}
