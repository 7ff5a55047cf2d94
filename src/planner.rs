//! Per-turn driver chaining the routing phases.
//!
//! Phases run in a fixed order and each one sees the slots claimed by the
//! phases before it:
//! 1. Units with cargo space head for resources
//! 2. Full units are matched to cities that need fuel
//! 3. One city phase per matched city, by ascending city id
//! 4. With no founder committed, the remaining full units race for the best
//!    city sites and the routed ones become founders
//! 5. Committed founders build on their site or step toward it
//! 6. Full units still unrouted get the resource bias as leftovers

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::colonizers::ColonizerRegistry;
use crate::config::{SiteRanking, Tuning};
use crate::routing::colony::step_toward_site;
use crate::routing::{
    extract_routes, routed_units, Move, ObstacleMap, Reservations, Route, RoutingGraph, Target,
};
use crate::supply::{assign_fuel, FuelAssignment};
use crate::survey::SiteSurvey;
use crate::world::{CityId, Coord, Direction, Unit, UnitId, World};

/// The phase that produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Towards resources.
    Resource,
    /// Delivering fuel to a city.
    City,
    /// Racing for a new city site.
    Colony,
    /// A committed founder stepping toward its site.
    Founder,
    /// Idle full units.
    Leftover,
}

/// A move tagged with its phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    /// Producing phase.
    pub phase: Phase,
    /// Unit to move.
    pub unit: UnitId,
    /// Direction of the step.
    pub direction: Direction,
}

impl PlannedMove {
    /// The bare move command.
    #[must_use]
    pub fn to_move(&self) -> Move {
        Move::new(self.unit.clone(), self.direction)
    }
}

/// Build a city tile where the unit stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCity {
    /// The founder.
    pub unit: UnitId,
}

/// Everything decided for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPlan {
    /// Turn the plan is for.
    pub turn: u32,
    /// Moves in phase order.
    pub moves: Vec<PlannedMove>,
    /// City tiles to build.
    pub builds: Vec<BuildCity>,
    /// Fuel deliveries, in commitment order.
    pub assignments: Vec<FuelAssignment>,
}

impl TurnPlan {
    /// Moves produced by one phase.
    pub fn moves_in(&self, phase: Phase) -> impl Iterator<Item = &PlannedMove> {
        self.moves.iter().filter(move |m| m.phase == phase)
    }

    /// The move of a unit, if it got one.
    #[must_use]
    pub fn move_of(&self, unit: &UnitId) -> Option<&PlannedMove> {
        self.moves.iter().find(|m| &m.unit == unit)
    }

    /// Check if a unit has a move or a build.
    #[must_use]
    pub fn has_command(&self, unit: &UnitId) -> bool {
        self.move_of(unit).is_some() || self.builds.iter().any(|b| &b.unit == unit)
    }
}

/// Shared state of the phases of one turn.
struct PhaseChain<'a> {
    world: &'a World,
    tuning: &'a Tuning,
    reservations: Reservations,
    routed: HashSet<UnitId>,
    plan: TurnPlan,
}

impl<'a> PhaseChain<'a> {
    fn new(world: &'a World, tuning: &'a Tuning) -> Self {
        Self {
            world,
            tuning,
            reservations: Reservations::new(),
            routed: HashSet::new(),
            plan: TurnPlan {
                turn: world.turn,
                ..TurnPlan::default()
            },
        }
    }

    /// Build, solve and decode one phase, then claim its slots.
    fn run(&mut self, phase: Phase, units: &[&Unit], target: &Target) -> Vec<Route> {
        if units.is_empty() {
            return Vec::new();
        }

        let mut exempt = self.routed.clone();
        exempt.extend(units.iter().map(|unit| unit.id.clone()));
        let obstacles = match phase {
            Phase::Colony => ObstacleMap::for_colony(self.world, &exempt),
            _ => ObstacleMap::for_routing(self.world, &exempt),
        };

        let mut graph = RoutingGraph::build(
            self.world,
            self.tuning,
            units,
            target,
            &obstacles,
            &self.reservations,
        );
        graph.solve();

        let routes = extract_routes(&graph);
        self.reservations.absorb(&graph);
        for route in &routes {
            if let Some(mv) = route.to_move() {
                self.push_move(phase, mv.unit, route.from, mv.direction);
            }
        }
        self.routed.extend(routed_units(&graph));

        debug!(
            ?phase,
            units = units.len(),
            routed = routes.len(),
            "finished routing phase"
        );
        routes
    }

    /// Record a move and claim the cell it lands on at step 1.
    ///
    /// A route may wait before its first movement, so the flow slots alone
    /// do not always cover the cell the unit enters this turn.
    fn push_move(&mut self, phase: Phase, unit: UnitId, from: Coord, direction: Direction) {
        let map = &self.world.map;
        let next = from.step(direction, map.width(), map.height());
        if let Some(idx) = next.and_then(|next| map.index_of(next)) {
            self.reservations.reserve(1, idx);
        }
        self.plan.moves.push(PlannedMove {
            phase,
            unit,
            direction,
        });
    }
}

/// Plan one turn.
///
/// Refreshes `colonizers` first, commits new founders during the colony
/// phase, and removes founders that build this turn.
#[must_use]
pub fn plan_turn(world: &World, tuning: &Tuning, colonizers: &mut ColonizerRegistry) -> TurnPlan {
    colonizers.refresh(world);
    let founders: Vec<UnitId> = colonizers.iter().map(|(unit, _)| unit.clone()).collect();

    let constants = &world.constants;
    let ready = world
        .units
        .iter()
        .filter(|unit| unit.can_act && !colonizers.contains(&unit.id));
    let collectors: Vec<&Unit> = ready
        .clone()
        .filter(|unit| !unit.is_full(constants))
        .collect();
    let full: Vec<&Unit> = ready.filter(|unit| unit.is_full(constants)).collect();

    let mut chain = PhaseChain::new(world, tuning);

    chain.run(Phase::Resource, &collectors, &Target::Resources);

    let assignments = assign_fuel(world, tuning, &full);
    let mut by_city: BTreeMap<&CityId, Vec<&Unit>> = BTreeMap::new();
    for assignment in &assignments {
        if let Some(unit) = full.iter().find(|unit| unit.id == assignment.unit) {
            by_city.entry(&assignment.city).or_default().push(unit);
        }
    }
    for (city, units) in &by_city {
        chain.run(Phase::City, units, &Target::City((*city).clone()));
    }

    if founders.is_empty() {
        let candidates: Vec<&Unit> = full
            .iter()
            .copied()
            .filter(|unit| assignments.iter().all(|a| a.unit != unit.id))
            .collect();
        if !candidates.is_empty() {
            let sites = candidate_sites(world, tuning);
            let routes = chain.run(Phase::Colony, &candidates, &Target::Sites(sites.clone()));
            for route in routes {
                if let Some(goal) = route.goal.filter(|goal| sites.contains(goal)) {
                    colonizers.commit(route.unit, goal);
                }
            }
        }
    }

    let committed: Vec<(UnitId, Coord)> = colonizers
        .iter()
        .map(|(unit, site)| (unit.clone(), site))
        .collect();
    for (unit_id, site) in committed {
        if chain.plan.move_of(&unit_id).is_some() {
            continue;
        }
        let Some(unit) = world.unit(&unit_id) else {
            continue;
        };
        if !unit.can_act {
            continue;
        }
        if unit.pos == site {
            colonizers.complete(&unit_id);
            chain.plan.builds.push(BuildCity { unit: unit_id });
            continue;
        }
        let direction = step_toward_site(world, unit, site, &chain.reservations);
        if direction != Direction::Center {
            chain.push_move(Phase::Founder, unit_id, unit.pos, direction);
        }
    }

    let leftovers: Vec<&Unit> = full
        .iter()
        .copied()
        .filter(|unit| !chain.routed.contains(&unit.id) && !colonizers.contains(&unit.id))
        .collect();
    chain.run(Phase::Leftover, &leftovers, &Target::Leftover);

    let mut plan = chain.plan;
    plan.assignments = assignments;
    debug!(
        turn = plan.turn,
        moves = plan.moves.len(),
        builds = plan.builds.len(),
        "planned turn"
    );
    plan
}

/// Candidate sites for the colony phase.
fn candidate_sites(world: &World, tuning: &Tuning) -> Vec<Coord> {
    let survey = SiteSurvey::new(world, tuning);
    match tuning.site_ranking {
        SiteRanking::Placement => survey.find_k_potential_city_locations(tuning.candidate_sites),
        SiteRanking::Clumps => {
            survey.growth_and_explore_sites(tuning.growth_sites, tuning.explore_sites)
        }
    }
}
