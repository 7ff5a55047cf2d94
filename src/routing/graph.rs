//! Time-expanded routing graph.
//!
//! Node layout for `N` cells and `T` timed layers:
//! - `entry(t, c) = 2Nt + 2c`, `exit(t, c) = entry(t, c) + 1`
//! - `arrived(c) = 2NT + c`
//! - source and sink follow at `2NT + N` and `2NT + N + 1`
//!
//! The entry to exit edge of a (time, cell) pair carries at most one unit,
//! except on our own city tiles, which hold any number.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::config::Tuning;
use crate::flow::{EdgeId, FlowGraph, FlowOutcome, NodeId, UNBOUNDED};
use crate::routing::{ObstacleMap, Target};
use crate::world::{Coord, Unit, UnitId, World};

/// What a node of a [`RoutingGraph`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNode {
    /// A unit arrives on `cell` at time `step`.
    Entry {
        /// Time step.
        step: usize,
        /// Cell.
        cell: Coord,
    },
    /// A unit leaves `cell` after time `step`.
    Exit {
        /// Time step.
        step: usize,
        /// Cell.
        cell: Coord,
    },
    /// The untimed layer past the horizon.
    Arrived(Coord),
    /// The flow source.
    Source,
    /// The flow sink.
    Sink,
}

impl GraphNode {
    /// Cell of a grid node.
    #[must_use]
    pub const fn cell(self) -> Option<Coord> {
        match self {
            GraphNode::Entry { cell, .. } | GraphNode::Exit { cell, .. } | GraphNode::Arrived(cell) => {
                Some(cell)
            }
            GraphNode::Source | GraphNode::Sink => None,
        }
    }
}

/// A solved or unsolved routing problem for one phase.
#[derive(Debug, Clone)]
pub struct RoutingGraph {
    flow: FlowGraph<UnitId>,
    width: u16,
    height: u16,
    cells: usize,
    layers: usize,
    occupancy: Vec<Option<EdgeId>>,
    unbounded: Vec<bool>,
    sources: Vec<(EdgeId, Coord)>,
    outcome: FlowOutcome,
}

impl RoutingGraph {
    /// Build the graph for one phase.
    ///
    /// `units` are the phase's own units, each getting one source edge in
    /// the given order. Their start cells are always open, even when the
    /// obstacle policy blocks them. Occupancy slots held in `reservations`
    /// are left out, except on our city tiles.
    #[must_use]
    pub fn build(
        world: &World,
        tuning: &Tuning,
        units: &[&Unit],
        target: &Target,
        obstacles: &ObstacleMap,
        reservations: &Reservations,
    ) -> Self {
        let map = &world.map;
        let cells = map.len();
        let layers = tuning.time_layers.max(1);

        let mut open: Vec<bool> = (0..cells).map(|idx| !obstacles.is_blocked(idx)).collect();
        for unit in units {
            if let Some(idx) = map.index_of(unit.pos) {
                open[idx] = true;
            }
        }

        let unbounded: Vec<bool> = (0..cells)
            .map(|idx| world.is_friendly_city_tile(map.coord_of(idx)))
            .collect();
        let capacity = |idx: usize| if unbounded[idx] { UNBOUNDED } else { 1 };
        let leave_cost: Vec<i64> = (0..cells)
            .map(|idx| {
                let self_sufficient = world
                    .friendly_city_at(map.coord_of(idx))
                    .is_some_and(|city| city.survives_night(&world.constants));
                if self_sufficient { tuning.leave_penalty } else { 1 }
            })
            .collect();

        let mut graph = Self {
            flow: FlowGraph::new(2 * cells * layers + cells),
            width: map.width(),
            height: map.height(),
            cells,
            layers,
            occupancy: vec![None; layers * cells],
            unbounded: unbounded.clone(),
            sources: Vec::with_capacity(units.len()),
            outcome: FlowOutcome::default(),
        };

        for step in 0..layers {
            for idx in 0..cells {
                if !open[idx] {
                    continue;
                }
                if unbounded[idx] || !reservations.is_reserved(step, idx) {
                    let entry = graph.entry(step, idx);
                    let id = graph.flow.add_edge(entry, entry + 1, capacity(idx), 0);
                    graph.occupancy[step * cells + idx] = Some(id);
                }

                let exit = graph.entry(step, idx) + 1;
                let stay = graph.next_layer(step, idx);
                graph.flow.add_edge(exit, stay, capacity(idx), 0);

                let (adjacent, count) = map.adjacent(map.coord_of(idx));
                for &neighbor in &adjacent[..count as usize] {
                    let Some(next) = map.index_of(neighbor) else {
                        continue;
                    };
                    if !open[next] {
                        continue;
                    }
                    let head = graph.next_layer(step, next);
                    graph.flow.add_edge(exit, head, capacity(idx), leave_cost[idx]);
                }
            }
        }

        for unit in units {
            let Some(idx) = map.index_of(unit.pos) else {
                continue;
            };
            let source = graph.flow.source();
            let entry = graph.entry(0, idx);
            let id = graph.flow.add_tagged_edge(source, entry, 1, 0, unit.id.clone());
            graph.sources.push((id, unit.pos));
        }

        let sink_edges = sink_edges(world, tuning, target, &open, &unbounded);
        let sink = graph.flow.sink();
        for idx in 0..cells {
            if !open[idx] {
                continue;
            }
            let arrived = graph.arrived(idx);
            if let Some((cap, cost)) = sink_edges[idx] {
                graph.flow.add_edge(arrived, sink, cap, cost);
            }
            let (adjacent, count) = map.adjacent(map.coord_of(idx));
            for &neighbor in &adjacent[..count as usize] {
                let Some(next) = map.index_of(neighbor) else {
                    continue;
                };
                if open[next] {
                    let head = graph.arrived(next);
                    graph.flow.add_edge(arrived, head, UNBOUNDED, 1);
                }
            }
        }

        debug!(
            units = units.len(),
            layers,
            nodes = graph.flow.node_count(),
            edges = graph.flow.edge_count(),
            "built routing graph"
        );
        graph
    }

    /// Solve the flow problem. Calling it twice adds nothing.
    pub fn solve(&mut self) -> FlowOutcome {
        let extra = self.flow.solve();
        self.outcome.cost += extra.cost;
        self.outcome.flow += extra.flow;
        debug!(
            flow = self.outcome.flow,
            cost = self.outcome.cost,
            "solved routing graph"
        );
        self.outcome
    }

    /// Totals of the last solve.
    #[must_use]
    pub const fn outcome(&self) -> FlowOutcome {
        self.outcome
    }

    /// The underlying flow network.
    #[must_use]
    pub const fn flow_graph(&self) -> &FlowGraph<UnitId> {
        &self.flow
    }

    /// Number of timed layers.
    #[must_use]
    pub const fn layers(&self) -> usize {
        self.layers
    }

    /// Source edges with the start cell of their unit, in insertion order.
    #[must_use]
    pub fn sources(&self) -> &[(EdgeId, Coord)] {
        &self.sources
    }

    /// What a node stands for.
    #[must_use]
    pub fn decode(&self, node: NodeId) -> GraphNode {
        let timed = 2 * self.cells * self.layers;
        if node == self.flow.source() {
            GraphNode::Source
        } else if node == self.flow.sink() {
            GraphNode::Sink
        } else if node >= timed {
            GraphNode::Arrived(self.coord_of(node - timed))
        } else {
            let step = node / (2 * self.cells);
            let cell = self.coord_of(node % (2 * self.cells) / 2);
            if node % 2 == 0 {
                GraphNode::Entry { step, cell }
            } else {
                GraphNode::Exit { step, cell }
            }
        }
    }

    /// Whether the cell holds any number of units at once.
    #[must_use]
    pub fn is_unbounded(&self, idx: usize) -> bool {
        self.unbounded.get(idx).copied().unwrap_or(false)
    }

    /// The occupancy edge of a (time, cell) pair, if it was built.
    #[must_use]
    pub fn occupancy_edge(&self, step: usize, idx: usize) -> Option<EdgeId> {
        if step >= self.layers || idx >= self.cells {
            return None;
        }
        self.occupancy[step * self.cells + idx]
    }

    /// Cells holding at least one unit at time `step`, in row-major order.
    #[must_use]
    pub fn occupied_cells(&self, step: usize) -> Vec<Coord> {
        (0..self.cells)
            .filter(|&idx| {
                self.occupancy_edge(step, idx)
                    .is_some_and(|id| self.flow.flow(id) > 0)
            })
            .map(|idx| self.coord_of(idx))
            .collect()
    }

    /// Cost of moving from `from` at time `step` to `to` one step later,
    /// or `None` if the graph has no such edge.
    #[must_use]
    pub fn step_cost(&self, step: usize, from: Coord, to: Coord) -> Option<i64> {
        if step >= self.layers {
            return None;
        }
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        let head = self.next_layer(step, to);
        self.flow
            .out_edges(self.entry(step, from) + 1)
            .find(|(_, edge)| edge.to == head)
            .map(|(_, edge)| edge.cost)
    }

    const fn entry(&self, step: usize, idx: usize) -> NodeId {
        2 * self.cells * step + 2 * idx
    }

    const fn arrived(&self, idx: usize) -> NodeId {
        2 * self.cells * self.layers + idx
    }

    const fn next_layer(&self, step: usize, idx: usize) -> NodeId {
        if step + 1 == self.layers {
            self.arrived(idx)
        } else {
            self.entry(step + 1, idx)
        }
    }

    fn coord_of(&self, idx: usize) -> Coord {
        let width = usize::from(self.width);
        Coord::new(
            u16::try_from(idx % width).unwrap_or(u16::MAX),
            u16::try_from(idx / width).unwrap_or(u16::MAX),
        )
    }

    fn index_of(&self, coord: Coord) -> Option<usize> {
        (coord.x < self.width && coord.y < self.height)
            .then(|| usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
    }
}

/// Capacity and cost of the sink edge of every arrived cell.
fn sink_edges(
    world: &World,
    tuning: &Tuning,
    target: &Target,
    open: &[bool],
    unbounded: &[bool],
) -> Vec<Option<(i64, i64)>> {
    let map = &world.map;
    let mut edges = vec![None; map.len()];

    match target {
        Target::Resources | Target::Leftover => {
            let resources = world.minable_resources();
            if resources.is_empty() {
                return edges;
            }
            let distance = map.distance_field(resources, |_| true);
            for (idx, edge) in edges.iter_mut().enumerate() {
                if !open[idx] || distance[idx] == u32::MAX {
                    continue;
                }
                let cost = (i64::from(distance[idx]) - 1).max(0) * tuning.resource_distance_cost;
                let cap = if unbounded[idx] { UNBOUNDED } else { 1 };
                *edge = Some((cap, cost));
            }
        }
        Target::City(id) => {
            if let Some(city) = world.city(id) {
                for &tile in &city.tiles {
                    if let Some(idx) = map.index_of(tile) {
                        edges[idx] = Some((UNBOUNDED, 0));
                    }
                }
            }
        }
        Target::Sites(sites) => {
            for &site in sites {
                if let Some(idx) = map.index_of(site) {
                    edges[idx] = Some((1, 0));
                }
            }
        }
    }

    edges
}

/// (time, cell) slots claimed by units routed earlier in the turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reservations {
    slots: BTreeSet<(usize, usize)>,
}

impl Reservations {
    /// No reservations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every capacity-1 slot a solved graph filled.
    pub fn absorb(&mut self, graph: &RoutingGraph) {
        for step in 0..graph.layers {
            for idx in 0..graph.cells {
                if graph.is_unbounded(idx) {
                    continue;
                }
                let Some(id) = graph.occupancy_edge(step, idx) else {
                    continue;
                };
                if graph.flow.edge(id).is_saturated() {
                    self.slots.insert((step, idx));
                }
            }
        }
    }

    /// Claim a single slot, for units moved outside a flow phase.
    pub fn reserve(&mut self, step: usize, idx: usize) {
        self.slots.insert((step, idx));
    }

    /// Whether a slot is already claimed.
    #[must_use]
    pub fn is_reserved(&self, step: usize, idx: usize) -> bool {
        self.slots.contains(&(step, idx))
    }

    /// Number of claimed slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Units already routed, used as the exemption set of later phases.
pub(crate) fn routed_units(graph: &RoutingGraph) -> HashSet<UnitId> {
    graph
        .sources
        .iter()
        .filter(|&&(id, _)| graph.flow.flow(id) > 0)
        .filter_map(|&(id, _)| graph.flow.edge(id).tag.clone())
        .collect()
}
