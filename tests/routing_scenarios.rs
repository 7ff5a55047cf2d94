//! End-to-end routing scenarios on small maps.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};

use lantern::routing::{
    extract_moves, extract_routes, ObstacleMap, Reservations, Route, RoutingGraph, Target,
};
use lantern::world::{Cargo, CityEntry, ResourceEntry, ResourceKind, Snapshot, UnitEntry};
use lantern::{Coord, Direction, Move, Tuning, Unit, UnitId, World};

fn world(snapshot: Snapshot) -> World {
    snapshot.into_world().unwrap()
}

fn route(world: &World, units: &[&Unit], target: &Target) -> (RoutingGraph, Vec<Route>) {
    let exempt: HashSet<UnitId> = units.iter().map(|unit| unit.id.clone()).collect();
    let mut graph = RoutingGraph::build(
        world,
        &Tuning::default(),
        units,
        target,
        &ObstacleMap::for_routing(world, &exempt),
        &Reservations::new(),
    );
    graph.solve();
    let routes = extract_routes(&graph);
    (graph, routes)
}

/// Asserts no two routes hold the same non-city cell at the same step.
fn assert_collision_free(world: &World, routes: &[Route]) {
    let mut held: HashMap<(usize, Coord), &UnitId> = HashMap::new();
    for route in routes {
        for (step, &cell) in route.path.iter().enumerate() {
            if world.is_friendly_city_tile(cell) {
                continue;
            }
            if let Some(other) = held.insert((step, cell), &route.unit) {
                panic!("{other} and {} both hold {cell} at step {step}", route.unit);
            }
        }
    }
}

#[test]
fn test_single_unit_steps_toward_wood() {
    let world = world(Snapshot {
        width: 3,
        height: 3,
        resources: vec![ResourceEntry::new(2, 0, ResourceKind::Wood, 400)],
        units: vec![UnitEntry::new("u_1", 0, 0, 0)],
        ..Snapshot::default()
    });
    let units: Vec<&Unit> = world.units.iter().collect();
    let (graph, routes) = route(&world, &units, &Target::Resources);

    assert_eq!(graph.outcome().flow, 1);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].goal, Some(Coord::new(1, 0)));
    assert_eq!(
        extract_moves(&graph),
        vec![Move::new(UnitId::from("u_1"), Direction::East)]
    );
}

#[test]
fn test_contested_cell_taken_once() {
    // Only (1, 1) is open: the resource is held by an opponent and the rest
    // of the map belongs to the enemy.
    let world = world(Snapshot {
        width: 3,
        height: 3,
        resources: vec![ResourceEntry::new(1, 0, ResourceKind::Wood, 400)],
        cities: vec![CityEntry::new(
            "c_9",
            1,
            0,
            &[(0, 0), (2, 0), (0, 2), (1, 2), (2, 2)],
        )],
        units: vec![
            UnitEntry::new("u_1", 0, 0, 1),
            UnitEntry::new("u_2", 0, 2, 1),
            UnitEntry::new("u_9", 1, 1, 0),
        ],
        ..Snapshot::default()
    });
    let units: Vec<&Unit> = world.units.iter().collect();
    let (graph, routes) = route(&world, &units, &Target::Resources);

    let centre = Coord::new(1, 1);
    assert_eq!(graph.outcome().flow, 2);
    assert_eq!(routes.len(), 2);
    assert_eq!(routes.iter().filter(|r| r.goal == Some(centre)).count(), 1);
    assert_eq!(routes.iter().filter(|r| r.next == Some(centre)).count(), 1);
    assert_eq!(extract_moves(&graph).len(), 1);
    assert_collision_free(&world, &routes);
}

#[test]
fn test_leave_penalty_depends_on_night_fuel() {
    for (fuel, expected) in [(230, 3), (229, 1)] {
        let world = world(Snapshot {
            width: 3,
            height: 1,
            cities: vec![CityEntry::new("c_1", 0, fuel, &[(0, 0)])],
            ..Snapshot::default()
        });
        let graph = RoutingGraph::build(
            &world,
            &Tuning::default(),
            &[],
            &Target::Leftover,
            &ObstacleMap::open(&world),
            &Reservations::new(),
        );

        assert_eq!(
            graph.step_cost(0, Coord::new(0, 0), Coord::new(1, 0)),
            Some(expected),
            "fuel {fuel}"
        );
        // Steps between plain cells always cost one
        assert_eq!(graph.step_cost(0, Coord::new(1, 0), Coord::new(2, 0)), Some(1));
    }
}

#[test]
fn test_collector_holds_self_sufficient_city() {
    // Wood two steps east of a one-tile city: staying put costs 50 at the
    // sink, the first step brings that to zero
    for (fuel, leave_cost) in [(230, 3), (229, 1)] {
        let world = world(Snapshot {
            width: 3,
            height: 1,
            resources: vec![ResourceEntry::new(2, 0, ResourceKind::Wood, 400)],
            cities: vec![CityEntry::new("c_1", 0, fuel, &[(0, 0)])],
            units: vec![UnitEntry::new("u_1", 0, 0, 0)],
            ..Snapshot::default()
        });
        let units: Vec<&Unit> = world.units.iter().collect();
        let (graph, routes) = route(&world, &units, &Target::Resources);
        let home = Coord::new(0, 0);

        assert_eq!(
            graph.step_cost(0, home, Coord::new(1, 0)),
            Some(leave_cost),
            "fuel {fuel}"
        );
        assert_eq!(graph.outcome().cost, 1, "fuel {fuel}");
        assert_eq!(routes[0].goal, Some(Coord::new(1, 0)));
        assert_eq!(
            extract_moves(&graph),
            vec![Move::new(UnitId::from("u_1"), Direction::East)]
        );
        if leave_cost > 1 {
            // Leaving inside the horizon costs more than the untimed step,
            // so the unit holds the tile for every timed layer
            assert_eq!(routes[0].path, vec![home; graph.layers()]);
        }
    }
}

#[test]
fn test_many_units_never_collide() {
    let world = world(Snapshot {
        width: 7,
        height: 7,
        resources: vec![
            ResourceEntry::new(3, 3, ResourceKind::Wood, 500),
            ResourceEntry::new(6, 0, ResourceKind::Wood, 500),
        ],
        cities: vec![CityEntry::new("c_1", 0, 0, &[(0, 6), (1, 6)])],
        units: vec![
            UnitEntry::new("u_1", 0, 0, 0),
            UnitEntry::new("u_2", 0, 1, 0),
            UnitEntry::new("u_3", 0, 0, 1),
            UnitEntry::new("u_4", 0, 2, 2),
            UnitEntry::new("u_5", 0, 0, 6),
            UnitEntry::new("u_6", 0, 0, 6),
            UnitEntry::new("u_7", 0, 5, 5),
        ],
        ..Snapshot::default()
    });
    let units: Vec<&Unit> = world.units.iter().collect();
    let (graph, routes) = route(&world, &units, &Target::Resources);

    assert_eq!(routes.len(), units.len());
    for r in &routes {
        assert_eq!(r.path.len(), graph.layers());
        assert_eq!(r.path[0], r.from);
    }
    assert_collision_free(&world, &routes);
}

#[test]
fn test_chained_phases_respect_reservations() {
    let world = world(Snapshot {
        width: 5,
        height: 3,
        resources: vec![ResourceEntry::new(4, 1, ResourceKind::Wood, 500)],
        cities: vec![CityEntry::new("c_1", 0, 0, &[(0, 0), (0, 1)])],
        units: vec![
            UnitEntry::new("u_1", 0, 1, 1),
            UnitEntry::new("u_2", 0, 2, 0),
            UnitEntry::new("u_3", 0, 3, 1).with_cargo(Cargo::new(100, 0, 0)),
            UnitEntry::new("u_4", 0, 2, 2).with_cargo(Cargo::new(100, 0, 0)),
        ],
        ..Snapshot::default()
    });
    let tuning = Tuning::default();
    let (collectors, full): (Vec<&Unit>, Vec<&Unit>) = world
        .units
        .iter()
        .partition(|unit| !unit.is_full(&world.constants));

    let mut reservations = Reservations::new();
    let mut exempt: HashSet<UnitId> = collectors.iter().map(|u| u.id.clone()).collect();
    let mut first = RoutingGraph::build(
        &world,
        &tuning,
        &collectors,
        &Target::Resources,
        &ObstacleMap::for_routing(&world, &exempt),
        &reservations,
    );
    first.solve();
    reservations.absorb(&first);
    let mut routes = extract_routes(&first);

    exempt.extend(routes.iter().map(|r| r.unit.clone()));
    exempt.extend(full.iter().map(|u| u.id.clone()));
    let city = lantern::CityId::from("c_1");
    let mut second = RoutingGraph::build(
        &world,
        &tuning,
        &full,
        &Target::City(city),
        &ObstacleMap::for_routing(&world, &exempt),
        &reservations,
    );
    second.solve();
    routes.extend(extract_routes(&second));

    assert!(!reservations.is_empty());
    assert_eq!(routes.len(), 4);
    assert_collision_free(&world, &routes);
}

#[test]
fn test_routing_is_deterministic() {
    let snapshot = Snapshot {
        width: 6,
        height: 6,
        resources: vec![
            ResourceEntry::new(5, 5, ResourceKind::Wood, 300),
            ResourceEntry::new(0, 5, ResourceKind::Wood, 300),
        ],
        units: vec![
            UnitEntry::new("u_1", 0, 2, 2),
            UnitEntry::new("u_2", 0, 3, 2),
            UnitEntry::new("u_3", 0, 2, 3),
        ],
        ..Snapshot::default()
    };
    let first = world(snapshot.clone());
    let second = world(snapshot);
    let first_units: Vec<&Unit> = first.units.iter().collect();
    let second_units: Vec<&Unit> = second.units.iter().collect();

    let (_, a) = route(&first, &first_units, &Target::Resources);
    let (_, b) = route(&second, &second_units, &Target::Resources);
    assert_eq!(a, b);
}
