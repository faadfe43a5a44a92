mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use common::{fixture_network, fixtures_dir, line_position, safe_point};
use safeguard_lib::{
    CandidateFailurePolicy, Coordinate, Error, Hazard, HazardCategory, HazardSource, JsonStore,
    MemoryStore, NodeId, NodeLocator, RankingOrder, Result, RoadNetwork, RoutingConfig, SafePoint,
    SafePointSource, SafeRouteEngine, SpatialIndex,
};

const USER: Coordinate = Coordinate {
    lat: 40.670,
    lng: 14.750,
};

fn fixture_engine(config: RoutingConfig) -> SafeRouteEngine {
    SafeRouteEngine::with_spatial_index(fixture_network(), config)
}

/// Line `1 - 2 - 3 - 4 - 5` with cost 10 per edge and a spur `1 - 6` of cost 50.
fn spur_network() -> RoadNetwork {
    let mut builder = RoadNetwork::builder();
    for id in 1..=5 {
        builder.add_node(id, line_position(id)).unwrap();
    }
    builder.add_node(6, Coordinate::new(0.02, 0.01)).unwrap();
    for id in 1..5 {
        builder.add_edge(id, id + 1, 10.0).unwrap();
    }
    builder.add_edge(1, 6, 50.0).unwrap();
    builder.build()
}

fn fire_at(coordinate: Coordinate) -> Hazard {
    Hazard {
        id: "fire".to_string(),
        category: HazardCategory::Fire,
        active: true,
        coordinate: Some(coordinate),
    }
}

fn ids(routes: &[safeguard_lib::RouteResult]) -> Vec<&str> {
    routes
        .iter()
        .map(|route| route.destination.id.as_str())
        .collect()
}

#[test]
fn fixture_routes_are_ranked_by_distance() {
    let engine = fixture_engine(RoutingConfig::default());
    let store = JsonStore::new(fixtures_dir());

    let plan = engine.plan(USER, &store, &store).expect("plan succeeds");

    assert_eq!(plan.user_node, 101);
    assert_eq!(plan.hazards.len(), 3);
    assert_eq!(plan.blocked_nodes, 6);
    assert_eq!(
        ids(&plan.routes),
        vec!["piazza", "clinic-west", "scuola", "field-hospital", "ruggi"]
    );

    let (ruggi, safe) = plan.routes.split_last().unwrap();
    assert!(ruggi.dangerous);
    assert!(ruggi.blocked);
    assert_eq!(ruggi.reported_distance, ruggi.hazard_distance);
    assert!(ruggi.hazard_distance > 50_000.0);

    for route in safe {
        assert!(!route.dangerous, "{} should be safe", route.destination.id);
        assert!(!route.blocked);
        assert_eq!(route.reported_distance, route.real_distance);
        assert!(route.timings.is_some());
    }

    let field = &plan.routes[3];
    assert_eq!(field.destination.name, "Unnamed");
    assert_eq!(field.destination.category, "hospitals");
}

#[test]
fn reported_distances_follow_the_roads() {
    let engine = fixture_engine(RoutingConfig::default());
    let store = JsonStore::new(fixtures_dir());
    let routes = engine.compute_sorted_routes(USER, &store, &store);

    // One block east along the same street.
    let piazza = &routes[0];
    assert!((piazza.real_distance - 168.7).abs() < 1.0, "{}", piazza.real_distance);
    // Two blocks north.
    let clinic = &routes[1];
    assert!((clinic.real_distance - 444.8).abs() < 1.0, "{}", clinic.real_distance);
}

#[test]
fn candidate_count_limits_searches() {
    let config = RoutingConfig {
        candidate_count: 2,
        ..RoutingConfig::default()
    };
    let engine = fixture_engine(config);
    let store = JsonStore::new(fixtures_dir());

    let routes = engine.compute_sorted_routes(USER, &store, &store);
    assert_eq!(ids(&routes), vec!["piazza", "clinic-west"]);
}

#[test]
fn ranking_order_decides_where_dangerous_routes_go() {
    let points = vec![
        safe_point("near-danger", line_position(3)),
        safe_point("far-safe", Coordinate::new(0.02, 0.01)),
    ];
    let store = MemoryStore::new(vec![fire_at(line_position(5))], points);
    let user = line_position(1);

    let base = RoutingConfig {
        penalty_factor: 3.0,
        ..RoutingConfig::default()
    };

    let by_distance = SafeRouteEngine::with_spatial_index(spur_network(), base.clone())
        .compute_sorted_routes(user, &store, &store);
    assert_eq!(ids(&by_distance), vec!["near-danger", "far-safe"]);
    assert!(by_distance[0].dangerous);
    assert!(!by_distance[0].blocked);
    assert_eq!(by_distance[0].real_distance, 20.0);
    assert_eq!(by_distance[0].reported_distance, 40.0);
    assert_eq!(by_distance[1].reported_distance, 50.0);

    let safety_first = SafeRouteEngine::with_spatial_index(
        spur_network(),
        RoutingConfig {
            ranking: RankingOrder::SafetyFirst,
            ..base
        },
    )
    .compute_sorted_routes(user, &store, &store);
    assert_eq!(ids(&safety_first), vec!["far-safe", "near-danger"]);
}

fn split_network() -> RoadNetwork {
    let mut builder = RoadNetwork::builder();
    for id in 1..=4 {
        builder.add_node(id, line_position(id)).unwrap();
    }
    builder.add_edge(1, 2, 1.0).unwrap();
    builder.add_edge(3, 4, 1.0).unwrap();
    builder.build()
}

#[test]
fn unreachable_candidate_is_kept_with_sentinel() {
    let engine = SafeRouteEngine::with_spatial_index(split_network(), RoutingConfig::default());
    let store = MemoryStore::new(
        Vec::new(),
        vec![
            safe_point("island", line_position(4)),
            safe_point("mainland", line_position(2)),
        ],
    );

    let routes = engine.compute_sorted_routes(line_position(1), &store, &store);

    assert_eq!(ids(&routes), vec!["mainland", "island"]);
    let island = &routes[1];
    assert!(island.blocked);
    assert!(island.dangerous);
    assert_eq!(island.real_distance, 999_999.0);
    assert_eq!(island.reported_distance, 999_999.0);
    assert!(island.timings.is_none());
}

#[test]
fn unreachable_candidate_is_dropped_when_configured() {
    let config = RoutingConfig {
        on_candidate_failure: CandidateFailurePolicy::Drop,
        ..RoutingConfig::default()
    };
    let engine = SafeRouteEngine::with_spatial_index(split_network(), config);
    let store = MemoryStore::new(
        Vec::new(),
        vec![
            safe_point("island", line_position(4)),
            safe_point("mainland", line_position(2)),
        ],
    );

    let routes = engine.compute_sorted_routes(line_position(1), &store, &store);
    assert_eq!(ids(&routes), vec!["mainland"]);
}

#[test]
fn unresolvable_safe_point_follows_failure_policy() {
    let network = spur_network();
    let index = SpatialIndex::build(&network).with_max_snap_distance(5_000.0);
    let engine = SafeRouteEngine::new(network, Arc::new(index), RoutingConfig::default());
    let store = MemoryStore::new(
        Vec::new(),
        vec![
            safe_point("offshore", Coordinate::new(10.0, 10.0)),
            safe_point("nearby", line_position(2)),
        ],
    );

    let routes = engine.compute_sorted_routes(line_position(1), &store, &store);
    assert_eq!(ids(&routes), vec!["nearby", "offshore"]);
    assert!(routes[1].blocked);
}

struct FailingSource;

impl HazardSource for FailingSource {
    fn active_hazards(&self) -> Result<Vec<Hazard>> {
        Err(Error::UpstreamUnavailable {
            source_name: "hazards".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

impl SafePointSource for FailingSource {
    fn safe_points(&self) -> Result<Vec<SafePoint>> {
        Err(Error::UpstreamUnavailable {
            source_name: "safe points".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

#[test]
fn upstream_failure_yields_empty_results() {
    let engine = fixture_engine(RoutingConfig::default());
    let store = JsonStore::new(fixtures_dir());

    assert!(engine
        .compute_sorted_routes(USER, &FailingSource, &store)
        .is_empty());
    assert!(engine
        .compute_sorted_routes(USER, &store, &FailingSource)
        .is_empty());

    let error = engine
        .plan(USER, &FailingSource, &store)
        .expect_err("hazard source fails");
    assert!(matches!(error, Error::UpstreamUnavailable { .. }));
}

#[test]
fn invalid_user_position_is_rejected() {
    let engine = fixture_engine(RoutingConfig::default());
    let store = JsonStore::new(fixtures_dir());

    let error = engine
        .plan(Coordinate::new(f64::NAN, 14.75), &store, &store)
        .expect_err("nan latitude");
    assert!(matches!(error, Error::InvalidCoordinate { .. }));
    assert!(engine
        .compute_sorted_routes(Coordinate::new(95.0, 14.75), &store, &store)
        .is_empty());
}

#[test]
fn no_safe_points_yields_empty_plan() {
    let engine = fixture_engine(RoutingConfig::default());
    let store = MemoryStore::default();
    let plan = engine.plan(USER, &store, &store).unwrap();
    assert!(plan.routes.is_empty());
}

struct CountingLocator {
    inner: SpatialIndex,
    calls: AtomicUsize,
}

impl NodeLocator for CountingLocator {
    fn nearest_node(&self, coordinate: Coordinate) -> Result<NodeId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.nearest_node(coordinate)
    }
}

#[test]
fn safe_point_nodes_are_resolved_once() {
    let network = spur_network();
    let locator = Arc::new(CountingLocator {
        inner: SpatialIndex::build(&network),
        calls: AtomicUsize::new(0),
    });
    let engine = SafeRouteEngine::new(network, locator.clone(), RoutingConfig::default());
    let store = MemoryStore::new(Vec::new(), vec![safe_point("p", line_position(4))]);

    engine.compute_sorted_routes(line_position(1), &store, &store);
    assert_eq!(locator.calls.load(Ordering::SeqCst), 2);

    engine.compute_sorted_routes(line_position(1), &store, &store);
    assert_eq!(locator.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn concurrent_requests_do_not_share_weights() {
    let engine = Arc::new(SafeRouteEngine::with_spatial_index(
        spur_network(),
        RoutingConfig::default(),
    ));
    let points = vec![safe_point("end", line_position(5))];
    let burning = MemoryStore::new(vec![fire_at(line_position(4))], points.clone());
    let calm = MemoryStore::new(Vec::new(), points);

    thread::scope(|scope| {
        for _ in 0..4 {
            let engine = engine.clone();
            let burning = &burning;
            let calm = &calm;
            scope.spawn(move || {
                for _ in 0..10 {
                    let hot = engine.compute_sorted_routes(line_position(1), burning, burning);
                    assert!(hot[0].dangerous);
                    let cold = engine.compute_sorted_routes(line_position(1), calm, calm);
                    assert!(!cold[0].dangerous);
                    assert_eq!(cold[0].reported_distance, 40.0);
                }
            });
        }
    });
}
