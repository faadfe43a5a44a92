//! Safe-destination routing.
//!
//! [`SafeRouteEngine`] ties the pieces together for one request: it applies
//! the active hazards to a private copy of the network weights, narrows the
//! safe points to the nearest few, measures each with a hazard-free and a
//! hazard-aware search, classifies the pair and ranks the results.

pub mod classifier;
pub mod search;

use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cost::{HazardAwareCost, RealCost};
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::hazard::{
    apply_hazard_zones, Hazard, HazardCategory, HazardPolicy, HazardReport, DEFAULT_PENALTY_FACTOR,
    MAX_PENALTY_FACTOR,
};
use crate::network::{NodeId, RoadNetwork};
use crate::prefilter::select_candidates;
use crate::spatial::{NodeLocator, SpatialIndex};
use crate::store::{HazardSource, SafePoint, SafePointSource};

pub use classifier::{classify, rank, unreachable, Classification};
pub use search::{select_search, BidirectionalSearch, DijkstraSearch, PathSearch};

/// Environment variable overriding [`RoutingConfig::candidate_count`].
pub const CANDIDATES_ENV: &str = "SAFEGUARD_CANDIDATES";
/// Environment variable overriding [`RoutingConfig::danger_margin`].
pub const DANGER_MARGIN_ENV: &str = "SAFEGUARD_DANGER_MARGIN";
/// Environment variable overriding [`RoutingConfig::block_threshold`].
pub const BLOCK_THRESHOLD_ENV: &str = "SAFEGUARD_BLOCK_THRESHOLD";
/// Environment variable overriding [`RoutingConfig::penalty_factor`].
pub const PENALTY_FACTOR_ENV: &str = "SAFEGUARD_PENALTY_FACTOR";
/// Environment variable overriding [`RoutingConfig::ranking`].
pub const RANKING_ENV: &str = "SAFEGUARD_RANKING";
/// Environment variable overriding [`RoutingConfig::on_candidate_failure`].
pub const ON_FAILURE_ENV: &str = "SAFEGUARD_ON_FAILURE";

/// Supported shortest-distance algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchAlgorithm {
    /// Single-direction Dijkstra, the reference implementation.
    #[default]
    Dijkstra,
    /// Bidirectional Dijkstra meeting in the middle.
    Bidirectional,
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchAlgorithm::Dijkstra => "dijkstra",
            SearchAlgorithm::Bidirectional => "bidirectional",
        };
        f.write_str(value)
    }
}

impl FromStr for SearchAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(SearchAlgorithm::Dijkstra),
            "bidirectional" => Ok(SearchAlgorithm::Bidirectional),
            other => Err(format!("unknown search algorithm '{other}'")),
        }
    }
}

/// Order of the returned routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RankingOrder {
    /// Ascending reported distance only; dangerous routes may come first.
    #[default]
    Distance,
    /// Safe routes before dangerous ones, then ascending reported distance.
    SafetyFirst,
}

impl fmt::Display for RankingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RankingOrder::Distance => "distance",
            RankingOrder::SafetyFirst => "safety-first",
        };
        f.write_str(value)
    }
}

impl FromStr for RankingOrder {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(RankingOrder::Distance),
            "safety-first" | "safety_first" => Ok(RankingOrder::SafetyFirst),
            other => Err(format!("unknown ranking order '{other}'")),
        }
    }
}

/// What to do with a candidate whose destination cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateFailurePolicy {
    /// Keep the candidate with sentinel distances, flagged dangerous and
    /// blocked.
    #[default]
    KeepWithSentinel,
    /// Leave the candidate out of the results.
    Drop,
}

impl FromStr for CandidateFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep" | "keep-with-sentinel" | "keep_with_sentinel" => {
                Ok(CandidateFailurePolicy::KeepWithSentinel)
            }
            "drop" => Ok(CandidateFailurePolicy::Drop),
            other => Err(format!("unknown candidate failure policy '{other}'")),
        }
    }
}

/// Tunables of the routing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Number of safe points kept by the prefilter.
    pub candidate_count: usize,
    /// Extra distance the hazard-aware route may add before it counts as
    /// dangerous.
    pub danger_margin: f64,
    /// Hazard-aware distance above which a route is considered blocked.
    pub block_threshold: f64,
    /// Multiplier applied to edges inside a blast radius.
    pub penalty_factor: f64,
    /// Sentinel written in place of non-finite distances.
    pub unreachable_distance: f64,
    pub ranking: RankingOrder,
    pub on_candidate_failure: CandidateFailurePolicy,
    /// Hazard categories that penalise the network.
    pub blocking_categories: BTreeSet<HazardCategory>,
    /// Algorithm measuring the hazard-free distance.
    pub real_search: SearchAlgorithm,
    /// Algorithm measuring the hazard-aware distance.
    pub hazard_search: SearchAlgorithm,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            candidate_count: 5,
            danger_margin: 5.0,
            block_threshold: 50_000.0,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            unreachable_distance: 999_999.0,
            ranking: RankingOrder::Distance,
            on_candidate_failure: CandidateFailurePolicy::KeepWithSentinel,
            blocking_categories: HazardCategory::default_blocking(),
            real_search: SearchAlgorithm::Dijkstra,
            hazard_search: SearchAlgorithm::Bidirectional,
        }
    }
}

impl RoutingConfig {
    /// Defaults overlaid with the `SAFEGUARD_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Overlay values produced by `lookup`. Values that fail to parse are
    /// logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        override_field(&lookup, CANDIDATES_ENV, &mut self.candidate_count);
        override_bounded(&lookup, DANGER_MARGIN_ENV, &mut self.danger_margin, 0.0..=f64::MAX);
        override_bounded(&lookup, BLOCK_THRESHOLD_ENV, &mut self.block_threshold, 0.0..=f64::MAX);
        override_bounded(
            &lookup,
            PENALTY_FACTOR_ENV,
            &mut self.penalty_factor,
            1.0..=MAX_PENALTY_FACTOR,
        );
        override_field(&lookup, RANKING_ENV, &mut self.ranking);
        override_field(&lookup, ON_FAILURE_ENV, &mut self.on_candidate_failure);
    }

    /// Hazard application settings derived from this configuration.
    pub fn hazard_policy(&self) -> HazardPolicy {
        HazardPolicy {
            blocking_categories: self.blocking_categories.clone(),
            penalty_factor: self.penalty_factor,
        }
    }
}

fn override_field<F, T>(lookup: &F, key: &str, field: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *field = value,
        Err(error) => warn!(key, value = %raw, %error, "ignoring invalid configuration value"),
    }
}

/// Like [`override_field`], but a parsed value outside `range` is ignored too.
/// Infinities and NaN never fall inside a finite range.
fn override_bounded<F>(lookup: &F, key: &str, field: &mut f64, range: RangeInclusive<f64>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut value = *field;
    override_field(lookup, key, &mut value);
    if range.contains(&value) {
        *field = value;
    } else {
        warn!(
            key,
            value,
            min = *range.start(),
            max = *range.end(),
            "ignoring out-of-range configuration value"
        );
    }
}

/// Wall-clock time spent in each search, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTimings {
    pub real_search_us: u64,
    pub hazard_search_us: u64,
}

/// One ranked destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub destination: SafePoint,
    /// Hazard-aware distance for dangerous routes, real distance otherwise.
    pub reported_distance: f64,
    pub real_distance: f64,
    pub hazard_distance: f64,
    pub dangerous: bool,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timings: Option<SearchTimings>,
}

impl RouteResult {
    fn new(destination: SafePoint, verdict: Classification, timings: Option<SearchTimings>) -> Self {
        Self {
            destination,
            reported_distance: verdict.reported_distance,
            real_distance: verdict.real_distance,
            hazard_distance: verdict.hazard_distance,
            dangerous: verdict.dangerous,
            blocked: verdict.blocked,
            timings,
        }
    }
}

/// Full outcome of a routing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeRoutePlan {
    /// Node the user position was snapped to.
    pub user_node: NodeId,
    pub routes: Vec<RouteResult>,
    /// Active hazards considered for this request.
    pub hazards: Vec<Hazard>,
    /// Distinct nodes inside any blast radius.
    pub blocked_nodes: usize,
}

/// Computes ranked safe destinations for a user position.
///
/// The engine owns the unpenalised network. Every request works on its own
/// clone of the weights, so a shared engine serves concurrent requests
/// without locking around the searches.
pub struct SafeRouteEngine {
    network: RoadNetwork,
    locator: Arc<dyn NodeLocator>,
    config: RoutingConfig,
    snapped: RwLock<HashMap<(u64, u64), NodeId>>,
}

impl SafeRouteEngine {
    pub fn new(network: RoadNetwork, locator: Arc<dyn NodeLocator>, config: RoutingConfig) -> Self {
        Self {
            network,
            locator,
            config,
            snapped: RwLock::new(HashMap::new()),
        }
    }

    /// Build an engine that snaps positions with a [`SpatialIndex`] over the
    /// network itself.
    pub fn with_spatial_index(network: RoadNetwork, config: RoutingConfig) -> Self {
        let index = SpatialIndex::build(&network);
        Self::new(network, Arc::new(index), config)
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn locator(&self) -> &dyn NodeLocator {
        self.locator.as_ref()
    }

    /// Apply `hazards` to a fresh copy of the network weights.
    pub fn apply_hazards(&self, hazards: &[Hazard]) -> (RoadNetwork, HazardReport) {
        let mut overlay = self.network.clone();
        let report = apply_hazard_zones(
            &mut overlay,
            hazards,
            self.locator.as_ref(),
            &self.config.hazard_policy(),
        );
        (overlay, report)
    }

    /// Rank the safe points reachable from `user`.
    ///
    /// Errors from the sources or from snapping the user position are
    /// returned. Per-destination failures follow
    /// [`RoutingConfig::on_candidate_failure`].
    pub fn plan(
        &self,
        user: Coordinate,
        hazard_source: &dyn HazardSource,
        point_source: &dyn SafePointSource,
    ) -> Result<SafeRoutePlan> {
        let started = Instant::now();
        let user = Coordinate::checked(user.lat, user.lng)?;

        let hazards = hazard_source.active_hazards()?;
        let (overlay, report) = self.apply_hazards(&hazards);

        let points = point_source.safe_points()?;
        let user_node = self.locator.nearest_node(user)?;
        let candidates = select_candidates(user, &points, self.config.candidate_count);

        let mut routes: Vec<RouteResult> = candidates
            .into_iter()
            .filter_map(|point| self.measure(&overlay, user_node, point))
            .collect();
        rank(&mut routes, self.config.ranking);

        info!(
            lat = user.lat,
            lng = user.lng,
            user_node,
            hazards = hazards.len(),
            safe_points = points.len(),
            routes = routes.len(),
            dangerous = routes.iter().filter(|route| route.dangerous).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "computed safe routes"
        );

        Ok(SafeRoutePlan {
            user_node,
            routes,
            hazards,
            blocked_nodes: report.blocked_nodes,
        })
    }

    /// Like [`plan`](Self::plan), but any failure yields an empty list.
    pub fn compute_sorted_routes(
        &self,
        user: Coordinate,
        hazard_source: &dyn HazardSource,
        point_source: &dyn SafePointSource,
    ) -> Vec<RouteResult> {
        match self.plan(user, hazard_source, point_source) {
            Ok(plan) => plan.routes,
            Err(error) => {
                warn!(lat = user.lat, lng = user.lng, %error, "route computation failed");
                Vec::new()
            }
        }
    }

    /// Measure and classify one destination, or `None` when it is dropped.
    fn measure(&self, overlay: &RoadNetwork, user_node: NodeId, point: &SafePoint) -> Option<RouteResult> {
        let target = match self.resolve_point(point) {
            Ok(target) => target,
            Err(error) => {
                warn!(point = %point.id, %error, "cannot resolve safe point");
                return self.failed(point);
            }
        };

        let clock = Instant::now();
        let real = select_search(self.config.real_search).distance(overlay, user_node, target, &RealCost);
        let real_search_us = clock.elapsed().as_micros() as u64;

        if !real.is_finite() {
            warn!(point = %point.id, user_node, target, "safe point is unreachable");
            return self.failed(point);
        }

        let clock = Instant::now();
        let hazard =
            select_search(self.config.hazard_search).distance(overlay, user_node, target, &HazardAwareCost);
        let hazard_search_us = clock.elapsed().as_micros() as u64;

        let verdict = classify(real, hazard, &self.config);
        debug!(
            point = %point.id,
            target,
            real,
            hazard,
            dangerous = verdict.dangerous,
            blocked = verdict.blocked,
            real_search_us,
            hazard_search_us,
            "measured candidate"
        );

        Some(RouteResult::new(
            point.clone(),
            verdict,
            Some(SearchTimings {
                real_search_us,
                hazard_search_us,
            }),
        ))
    }

    fn failed(&self, point: &SafePoint) -> Option<RouteResult> {
        match self.config.on_candidate_failure {
            CandidateFailurePolicy::KeepWithSentinel => {
                Some(RouteResult::new(point.clone(), unreachable(&self.config), None))
            }
            CandidateFailurePolicy::Drop => None,
        }
    }

    /// Snap a safe point to its node, reusing earlier resolutions.
    fn resolve_point(&self, point: &SafePoint) -> Result<NodeId> {
        let key = (point.coordinate.lat.to_bits(), point.coordinate.lng.to_bits());
        if let Ok(cache) = self.snapped.read() {
            if let Some(&node) = cache.get(&key) {
                return Ok(node);
            }
        }

        let node = self.locator.nearest_node(point.coordinate)?;
        if !self.network.contains_node(node) {
            return Err(Error::UnknownNode { node });
        }
        if let Ok(mut cache) = self.snapped.write() {
            cache.insert(key, node);
        }
        Ok(node)
    }
}

impl fmt::Debug for SafeRouteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeRouteEngine")
            .field("nodes", &self.network.node_count())
            .field("edges", &self.network.edge_count())
            .field("config", &self.config)
            .finish()
    }
}
