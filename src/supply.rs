//! Matching full units to the cities that need their fuel.
//!
//! Each round builds a fresh flow network over the map: full units inject
//! their cargo's fuel value at their cell, fuel spreads through non-city
//! cells at cost 1 per step, and every city drains what it still lacks into
//! the sink. Only the single biggest (unit, city) delivery of the round is
//! committed before the network is rebuilt, so later rounds see the fuel
//! already pledged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Tuning;
use crate::flow::{EdgeId, FlowGraph, NodeId, UNBOUNDED};
use crate::world::{Cell, CityId, Unit, UnitId, World};

/// A unit told to carry its cargo to a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelAssignment {
    /// The full unit.
    pub unit: UnitId,
    /// The city it should feed.
    pub city: CityId,
    /// Fuel the flow delivered to that city in the round it was chosen.
    pub amount: u32,
}

/// Fuel a city wants before the pledges of this turn.
///
/// Upkeep over the next nights within the horizon. A player holding exactly
/// one single-tile city asks for nothing, so its workers keep building.
#[must_use]
pub fn fuel_estimate(world: &World, tuning: &Tuning, city_idx: usize) -> u32 {
    let Some(city) = world.cities.get(city_idx) else {
        return 0;
    };
    if world.cities.len() == 1 && city.tiles.len() == 1 {
        return 0;
    }
    city.fuel_needed(world.turn, tuning.fuel_horizon_nights, &world.constants)
}

/// Assign full units to cities, one commitment per round.
///
/// `full_units` is scanned in order each round. The round's biggest
/// positive delivery wins, ties going to the later candidate. Stops when a
/// round yields nothing or every unit is assigned.
#[must_use]
pub fn assign_fuel(world: &World, tuning: &Tuning, full_units: &[&Unit]) -> Vec<FuelAssignment> {
    let mut assignments: Vec<FuelAssignment> = Vec::new();

    for round in 0..full_units.len() {
        let pending: Vec<&Unit> = full_units
            .iter()
            .copied()
            .filter(|unit| assignments.iter().all(|a| a.unit != unit.id))
            .collect();

        let mut network = SupplyNetwork::build(world, tuning, &pending, &assignments);
        let outcome = network.graph.solve();
        debug!(round, flow = outcome.flow, cost = outcome.cost, "solved supply network");

        let Some(best) = network.best_candidate(world) else {
            break;
        };
        info!(
            unit = %best.unit,
            city = %best.city,
            amount = best.amount,
            "assigned fuel delivery"
        );
        assignments.push(best);
    }

    assignments
}

/// One round's network.
struct SupplyNetwork {
    graph: FlowGraph,
    cells: usize,
    /// Source edge and unit id, in unit order.
    sources: Vec<(EdgeId, UnitId)>,
}

impl SupplyNetwork {
    fn build(
        world: &World,
        tuning: &Tuning,
        pending: &[&Unit],
        assignments: &[FuelAssignment],
    ) -> Self {
        let map = &world.map;
        let cells = map.len();
        let mut graph = FlowGraph::new(cells + world.cities.len());
        let source = graph.source();
        let sink = graph.sink();

        let mut sources = Vec::with_capacity(pending.len());
        for unit in pending {
            let Some(idx) = map.index_of(unit.pos) else {
                continue;
            };
            let fuel = i64::from(unit.cargo.fuel_value(&world.constants));
            let id = graph.add_edge(source, idx, fuel, 0);
            sources.push((id, unit.id.clone()));
        }

        for (coord, cell) in map.iter() {
            let Some(idx) = map.index_of(coord) else {
                continue;
            };
            if let Some(tile) = cell.city_tile() {
                if tile.team != world.team {
                    continue;
                }
                if let Some(city_idx) = world.cities.iter().position(|c| c.id == tile.city) {
                    graph.add_edge(idx, cells + city_idx, UNBOUNDED, 0);
                }
                continue;
            }
            let (adjacent, count) = map.adjacent(coord);
            for &next in &adjacent[..count as usize] {
                if world.is_enemy_city_tile(next) {
                    continue;
                }
                if let Some(next_idx) = map.index_of(next) {
                    graph.add_edge(idx, next_idx, UNBOUNDED, 1);
                }
            }
        }

        for (city_idx, city) in world.cities.iter().enumerate() {
            let pledged: u32 = assignments
                .iter()
                .filter(|a| a.city == city.id)
                .filter_map(|a| world.unit(&a.unit))
                .map(|unit| unit.cargo.fuel_value(&world.constants))
                .sum();
            let wanted = i64::from(fuel_estimate(world, tuning, city_idx))
                - i64::from(city.fuel)
                - i64::from(pledged);
            graph.add_edge(cells + city_idx, sink, wanted.max(0), 0);
        }

        Self {
            graph,
            cells,
            sources,
        }
    }

    /// Walk every unit's flow and keep the biggest single delivery.
    fn best_candidate(&self, world: &World) -> Option<FuelAssignment> {
        let mut remaining = self.graph.flows();
        let mut best: Option<FuelAssignment> = None;

        for (source_edge, unit) in &self.sources {
            let sent = remaining[source_edge.index()];
            if sent <= 0 {
                continue;
            }
            remaining[source_edge.index()] = 0;
            let start = self.graph.edge(*source_edge).to;

            for (city_idx, amount) in self.deliveries(world, start, sent, &mut remaining) {
                let Some(city) = world.cities.get(city_idx) else {
                    continue;
                };
                let amount = u32::try_from(amount).unwrap_or(u32::MAX);
                if amount > 0 && best.as_ref().is_none_or(|b| amount >= b.amount) {
                    best = Some(FuelAssignment {
                        unit: unit.clone(),
                        city: city.id.clone(),
                        amount,
                    });
                }
            }
        }

        best
    }

    /// Follow `amount` units of flow from `start`, consuming it from
    /// `remaining`, and total what reaches each city node.
    fn deliveries(
        &self,
        world: &World,
        start: NodeId,
        amount: i64,
        remaining: &mut [i64],
    ) -> BTreeMap<usize, i64> {
        struct Frame {
            node: NodeId,
            budget: i64,
            cursor: usize,
        }

        let mut delivered = BTreeMap::new();
        let mut stack = vec![Frame {
            node: start,
            budget: amount,
            cursor: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.budget <= 0 {
                stack.pop();
                continue;
            }
            let Some((id, edge)) = self.graph.out_edges(frame.node).nth(frame.cursor) else {
                stack.pop();
                continue;
            };
            frame.cursor += 1;
            if remaining[id.index()] <= 0 {
                continue;
            }

            let send = frame.budget.min(remaining[id.index()]);
            if edge.to >= self.cells && edge.to < self.cells + world.cities.len() {
                let city_idx = edge.to - self.cells;
                let coord = world.map.coord_of(edge.from);
                let expected = world.cities.get(city_idx).map(|c| &c.id);
                let tile = world.map.get(coord).and_then(Cell::city_tile);
                if tile.map(|t| &t.city) != expected {
                    warn!(%coord, city_idx, "fuel path ends off its city tile, skipping");
                    continue;
                }
                remaining[id.index()] -= send;
                frame.budget -= send;
                *delivered.entry(city_idx).or_insert(0) += send;
            } else {
                remaining[id.index()] -= send;
                frame.budget -= send;
                let next = edge.to;
                stack.push(Frame {
                    node: next,
                    budget: send,
                    cursor: 0,
                });
            }
        }

        delivered
    }
}
