//! Turns a pair of distances into a safety verdict and orders the results.

use std::cmp::Ordering;

use super::{RankingOrder, RouteResult, RoutingConfig};

/// Distances and flags derived for one destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub real_distance: f64,
    pub hazard_distance: f64,
    pub reported_distance: f64,
    pub dangerous: bool,
    pub blocked: bool,
}

/// Classify a destination from its hazard-free and hazard-aware distances.
///
/// - `blocked` when the hazard-aware distance exceeds the block threshold.
/// - `dangerous` when it exceeds the real distance by more than the danger
///   margin, or when the destination is not reachable at all.
/// - the reported distance is the hazard-aware one for dangerous routes and
///   the real one otherwise.
///
/// Non-finite distances are replaced by the configured unreachable sentinel
/// so every field stays serialisable.
pub fn classify(real: f64, hazard: f64, config: &RoutingConfig) -> Classification {
    let blocked = hazard > config.block_threshold;
    let dangerous = !real.is_finite() || hazard > real + config.danger_margin;

    let real_distance = cap(real, config);
    let hazard_distance = cap(hazard, config);
    let reported_distance = if dangerous {
        hazard_distance
    } else {
        real_distance
    };

    Classification {
        real_distance,
        hazard_distance,
        reported_distance,
        dangerous,
        blocked,
    }
}

/// Verdict for a destination whose search could not run.
pub fn unreachable(config: &RoutingConfig) -> Classification {
    classify(f64::INFINITY, f64::INFINITY, config)
}

fn cap(distance: f64, config: &RoutingConfig) -> f64 {
    if distance.is_finite() {
        distance
    } else {
        config.unreachable_distance
    }
}

/// Sort results in place according to the ranking order. The sort is stable.
pub fn rank(results: &mut [RouteResult], order: RankingOrder) {
    match order {
        RankingOrder::Distance => {
            results.sort_by(|a, b| a.reported_distance.total_cmp(&b.reported_distance))
        }
        RankingOrder::SafetyFirst => results.sort_by(|a, b| {
            compare_danger(a.dangerous, b.dangerous)
                .then_with(|| a.reported_distance.total_cmp(&b.reported_distance))
        }),
    }
}

fn compare_danger(a: bool, b: bool) -> Ordering {
    a.cmp(&b)
}
