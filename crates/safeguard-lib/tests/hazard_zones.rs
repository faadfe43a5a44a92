mod common;

use common::{fixture_network, line_network, line_position};
use safeguard_lib::hazard::DEFAULT_PENALTY_FACTOR;
use safeguard_lib::{
    apply_hazard_zones, blast_radius, dijkstra_distance, routing::classify, Coordinate, Hazard,
    HazardAwareCost, HazardCategory, HazardPolicy, RealCost, RoadNetwork, RoutingConfig,
    SpatialIndex,
};

fn hazard(id: &str, category: HazardCategory, coordinate: Option<Coordinate>) -> Hazard {
    Hazard {
        id: id.to_string(),
        category,
        active: true,
        coordinate,
    }
}

fn effective_costs(network: &RoadNetwork) -> Vec<f64> {
    (0..network.edge_count())
        .map(|index| network.effective_cost(index))
        .collect()
}

#[test]
fn fire_in_the_middle_of_a_line_penalises_the_whole_line() {
    let mut network = line_network();
    let index = SpatialIndex::build(&network);
    let fire = hazard("fire", HazardCategory::Fire, Some(line_position(3)));

    let report = apply_hazard_zones(&mut network, &[fire], &index, &HazardPolicy::default());

    assert_eq!(report.zones[0].center, Some(3));
    assert_eq!(report.blocked_nodes, 5);
    assert_eq!(report.penalized_edges, 4);

    let real = dijkstra_distance(&network, 1, 5, &RealCost);
    let aware = dijkstra_distance(&network, 1, 5, &HazardAwareCost);
    assert_eq!(real, 4.0);
    assert_eq!(aware, 4.0 * DEFAULT_PENALTY_FACTOR);
    assert!(aware >= real);

    let verdict = classify(real, aware, &RoutingConfig::default());
    assert!(verdict.dangerous);
    assert!(verdict.blocked);
}

#[test]
fn only_edges_touching_the_blast_radius_are_penalised() {
    let pristine = fixture_network();
    let mut network = pristine.clone();
    let index = SpatialIndex::build(&network);
    let fire = hazard("fire", HazardCategory::Fire, Some(Coordinate::new(40.674, 14.758)));

    apply_hazard_zones(&mut network, &[fire], &index, &HazardPolicy::default());

    let blocked = blast_radius(&network, 305);
    assert_eq!(blocked.len(), 6);

    for (position, edge) in network.edges().iter().enumerate() {
        let inside = blocked.contains(&edge.source) || blocked.contains(&edge.target);
        let expected = if inside {
            edge.real_cost * DEFAULT_PENALTY_FACTOR
        } else {
            edge.real_cost
        };
        assert_eq!(
            network.effective_cost(position),
            expected,
            "edge {}->{}",
            edge.source,
            edge.target
        );
    }

    // The base network is untouched by changes to the clone.
    assert_eq!(
        effective_costs(&pristine),
        pristine.edges().iter().map(|edge| edge.real_cost).collect::<Vec<_>>()
    );
}

#[test]
fn applying_the_same_hazards_twice_is_idempotent() {
    let mut network = fixture_network();
    let index = SpatialIndex::build(&network);
    let hazards = vec![
        hazard("fire", HazardCategory::Fire, Some(Coordinate::new(40.674, 14.758))),
        hazard("flood", HazardCategory::Flood, Some(Coordinate::new(40.672, 14.756))),
    ];
    let policy = HazardPolicy::default();

    apply_hazard_zones(&mut network, &hazards, &index, &policy);
    let once = effective_costs(&network);
    apply_hazard_zones(&mut network, &hazards, &index, &policy);
    assert_eq!(effective_costs(&network), once);
}

#[test]
fn reset_restores_real_costs() {
    let mut network = line_network();
    let index = SpatialIndex::build(&network);
    let quake = hazard("quake", HazardCategory::Earthquake, Some(line_position(1)));
    apply_hazard_zones(&mut network, &[quake], &index, &HazardPolicy::default());
    assert!(network.effective_cost(0) > network.edges()[0].real_cost);

    network.reset_weights();
    for (position, edge) in network.edges().iter().enumerate() {
        assert_eq!(network.effective_cost(position), edge.real_cost);
    }
}

#[test]
fn applying_no_hazards_clears_previous_penalties() {
    let mut network = line_network();
    let index = SpatialIndex::build(&network);
    let policy = HazardPolicy::default();
    let fire = hazard("fire", HazardCategory::Fire, Some(line_position(2)));

    apply_hazard_zones(&mut network, &[fire], &index, &policy);
    let report = apply_hazard_zones(&mut network, &[], &index, &policy);

    assert_eq!(report.penalized_edges, 0);
    assert_eq!(dijkstra_distance(&network, 1, 5, &HazardAwareCost), 4.0);
}

#[test]
fn informational_and_unplaced_hazards_leave_weights_alone() {
    let mut network = line_network();
    let index = SpatialIndex::build(&network);
    let hazards = vec![
        hazard(
            "traffic",
            HazardCategory::parse("incidente stradale"),
            Some(line_position(3)),
        ),
        hazard("flood", HazardCategory::Flood, None),
        Hazard {
            active: false,
            ..hazard("old-fire", HazardCategory::Fire, Some(line_position(3)))
        },
    ];

    let report = apply_hazard_zones(&mut network, &hazards, &index, &HazardPolicy::default());

    assert_eq!(report.zones.len(), 3);
    assert!(!report.zones[0].blocking);
    assert!(report.zones[1].blocking);
    assert_eq!(report.zones[1].center, None);
    assert!(!report.zones[2].blocking);
    assert_eq!(report.penalized_edges, 0);
    assert_eq!(dijkstra_distance(&network, 1, 5, &HazardAwareCost), 4.0);
}

#[test]
fn narrowed_blocking_set_is_respected() {
    let mut network = line_network();
    let index = SpatialIndex::build(&network);
    let policy = HazardPolicy {
        blocking_categories: [HazardCategory::Earthquake].into_iter().collect(),
        penalty_factor: 10.0,
    };
    let hazards = vec![
        hazard("fire", HazardCategory::Fire, Some(line_position(1))),
        hazard("quake", HazardCategory::Earthquake, Some(line_position(5))),
    ];

    let report = apply_hazard_zones(&mut network, &hazards, &index, &policy);

    assert_eq!(report.blocked_nodes, 3);
    // Only 1-2 stays clear: 2-3 touches node 3, which is two hops from 5.
    assert_eq!(dijkstra_distance(&network, 1, 5, &HazardAwareCost), 31.0);
}
