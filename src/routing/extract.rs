//! Decode a solved routing graph into per-unit routes.

use crate::routing::{GraphNode, Move, RoutingGraph};
use crate::world::{Coord, Direction, UnitId};

/// The decoded route of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// The routed unit.
    pub unit: UnitId,
    /// Where it stands now.
    pub from: Coord,
    /// Head of the first real movement on its path, if any.
    pub next: Option<Coord>,
    /// Arrived-layer cell whose sink edge carried the unit.
    pub goal: Option<Coord>,
    /// Cell held at each timed step.
    pub path: Vec<Coord>,
}

impl Route {
    /// The move command for this route. Holding position gives `None`.
    #[must_use]
    pub fn to_move(&self) -> Option<Move> {
        let next = self.next?;
        match self.from.direction_to(next) {
            Direction::Center => None,
            direction => Some(Move::new(self.unit.clone(), direction)),
        }
    }
}

/// Follow the flow of every routed unit from source to sink.
///
/// Units are visited in source-edge order. Each walk takes the first
/// outgoing edge with flow left on a private copy of the flows and consumes
/// one unit of it, so units sharing a city tile decode distinct paths.
#[must_use]
pub fn extract_routes(graph: &RoutingGraph) -> Vec<Route> {
    let flow = graph.flow_graph();
    let sink = flow.sink();
    let mut remaining = flow.flows();
    let mut routes = Vec::new();

    for &(source_edge, from) in graph.sources() {
        if remaining[source_edge.index()] <= 0 {
            continue;
        }
        let Some(unit) = flow.edge(source_edge).tag.clone() else {
            continue;
        };
        remaining[source_edge.index()] -= 1;

        let mut route = Route {
            unit,
            from,
            next: None,
            goal: None,
            path: Vec::with_capacity(graph.layers()),
        };
        let mut node = flow.edge(source_edge).to;

        // Paths are simple, so the node count bounds the walk.
        for _ in 0..flow.node_count() {
            if let GraphNode::Entry { cell, .. } = graph.decode(node) {
                route.path.push(cell);
            }
            let Some((id, edge)) = flow
                .out_edges(node)
                .find(|(id, _)| remaining[id.index()] > 0)
            else {
                break;
            };
            remaining[id.index()] -= 1;

            if edge.to == sink {
                route.goal = graph.decode(node).cell();
                break;
            }
            if route.next.is_none() && edge.cost > 0 {
                route.next = graph.decode(edge.to).cell();
            }
            node = edge.to;
        }

        routes.push(route);
    }

    routes
}

/// Move commands of a solved graph, in source-edge order.
#[must_use]
pub fn extract_moves(graph: &RoutingGraph) -> Vec<Move> {
    extract_routes(graph)
        .iter()
        .filter_map(Route::to_move)
        .collect()
}
