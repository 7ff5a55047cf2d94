//! Property-based tests for the min-cost max-flow solver.
//!
//! Every solve is checked against the optimality certificates of min-cost
//! max-flow: no augmenting path is left in the residual graph, and the
//! residual graph has no negative-cost cycle. Tiny networks are also checked
//! against an exhaustive enumeration of every feasible flow.
//! Run with: cargo test --release prop_flow

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use lantern::flow::{FlowGraph, NodeId};

/// (from, to, capacity, cost) over `nodes` regular nodes plus source and sink.
type EdgeSpec = (usize, usize, i64, i64);

fn network() -> impl Strategy<Value = (usize, Vec<EdgeSpec>)> {
    (1usize..6).prop_flat_map(|nodes| {
        let total = nodes + 2;
        (
            Just(nodes),
            prop::collection::vec((0..total, 0..total, 0i64..5, 0i64..10), 0..24),
        )
    })
}

fn build(nodes: usize, specs: &[EdgeSpec]) -> FlowGraph {
    let mut graph: FlowGraph = FlowGraph::new(nodes);
    let source = graph.source();
    let sink = graph.sink();
    for &(from, to, capacity, cost) in specs {
        if from == to || to == source || from == sink {
            continue;
        }
        graph.add_edge(from, to, capacity, cost);
    }
    graph
}

/// Residual arcs as (from, to, cost).
fn residual_arcs(graph: &FlowGraph) -> Vec<(NodeId, NodeId, i64)> {
    let mut arcs = Vec::new();
    for (_, edge) in graph.forward_edges() {
        if edge.residual() > 0 {
            arcs.push((edge.from, edge.to, edge.cost));
        }
        if edge.flow > 0 {
            arcs.push((edge.to, edge.from, -edge.cost));
        }
    }
    arcs
}

fn sink_reachable(graph: &FlowGraph) -> bool {
    let arcs = residual_arcs(graph);
    let mut seen = vec![false; graph.node_count()];
    let mut stack = vec![graph.source()];
    seen[graph.source()] = true;
    while let Some(node) = stack.pop() {
        for &(from, to, _) in &arcs {
            if from == node && !seen[to] {
                seen[to] = true;
                stack.push(to);
            }
        }
    }
    seen[graph.sink()]
}

fn has_negative_cycle(graph: &FlowGraph) -> bool {
    let arcs = residual_arcs(graph);
    let mut dist = vec![0i64; graph.node_count()];
    for _ in 0..graph.node_count() {
        let mut changed = false;
        for &(from, to, cost) in &arcs {
            if dist[from] + cost < dist[to] {
                dist[to] = dist[from] + cost;
                changed = true;
            }
        }
        if !changed {
            return false;
        }
    }
    true
}

/// Networks small enough to enumerate: at most 8 edges of capacity <= 2.
fn tiny_network() -> impl Strategy<Value = (usize, Vec<EdgeSpec>)> {
    (1usize..4).prop_flat_map(|nodes| {
        let total = nodes + 2;
        (
            Just(nodes),
            prop::collection::vec((0..total, 0..total, 0i64..3, 0i64..6), 0..8),
        )
    })
}

/// Best (flow, cost) over every integral flow: maximum flow first, then
/// minimum cost.
fn enumerate_best(graph: &FlowGraph) -> (i64, i64) {
    let edges: Vec<(NodeId, NodeId, i64, i64)> = graph
        .forward_edges()
        .map(|(_, edge)| (edge.from, edge.to, edge.capacity, edge.cost))
        .collect();
    let mut flows = vec![0i64; edges.len()];
    let mut best = (0, 0);

    loop {
        let mut balance = vec![0i64; graph.node_count()];
        for (&(from, to, _, _), &f) in edges.iter().zip(&flows) {
            balance[from] -= f;
            balance[to] += f;
        }
        let conserved = (0..graph.node_count())
            .filter(|&node| node != graph.source() && node != graph.sink())
            .all(|node| balance[node] == 0);
        if conserved {
            let value = balance[graph.sink()];
            let cost: i64 = edges.iter().zip(&flows).map(|(e, &f)| e.3 * f).sum();
            if value > best.0 || (value == best.0 && cost < best.1) {
                best = (value, cost);
            }
        }

        // Next assignment, odometer style
        let mut idx = 0;
        loop {
            if idx == edges.len() {
                return best;
            }
            if flows[idx] < edges[idx].2 {
                flows[idx] += 1;
                break;
            }
            flows[idx] = 0;
            idx += 1;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// The solver matches exhaustive search on tiny networks.
    #[test]
    fn prop_matches_enumeration((nodes, specs) in tiny_network()) {
        let mut graph = build(nodes, &specs);
        let expected = enumerate_best(&graph);
        let outcome = graph.solve();

        prop_assert_eq!((outcome.flow, outcome.cost), expected);
    }

    /// Flow stays within capacity and is conserved at every regular node.
    #[test]
    fn prop_capacity_and_conservation((nodes, specs) in network()) {
        let mut graph = build(nodes, &specs);
        let outcome = graph.solve();

        let mut balance = vec![0i64; graph.node_count()];
        let mut cost = 0;
        for (id, edge) in graph.forward_edges() {
            prop_assert!(edge.flow >= 0 && edge.flow <= edge.capacity);
            prop_assert_eq!(edge.flow, -graph.reverse(id).flow);
            balance[edge.from] -= edge.flow;
            balance[edge.to] += edge.flow;
            cost += edge.flow * edge.cost;
        }

        for node in 0..nodes {
            prop_assert_eq!(balance[node], 0);
        }
        prop_assert_eq!(balance[graph.sink()], outcome.flow);
        prop_assert_eq!(balance[graph.source()], -outcome.flow);
        prop_assert_eq!(cost, outcome.cost);
    }

    /// The flow is maximum and of minimum cost.
    #[test]
    fn prop_optimal((nodes, specs) in network()) {
        let mut graph = build(nodes, &specs);
        graph.solve();

        prop_assert!(!sink_reachable(&graph));
        prop_assert!(!has_negative_cycle(&graph));
    }

    /// Solving an identical network gives identical flows.
    #[test]
    fn prop_deterministic((nodes, specs) in network()) {
        let mut first = build(nodes, &specs);
        let mut second = build(nodes, &specs);

        prop_assert_eq!(first.solve(), second.solve());
        prop_assert_eq!(first.flows(), second.flows());
    }

    /// A second solve on a solved graph pushes nothing more.
    #[test]
    fn prop_resolve_is_noop((nodes, specs) in network()) {
        let mut graph = build(nodes, &specs);
        graph.solve();
        let flows = graph.flows();

        prop_assert_eq!(graph.solve().flow, 0);
        prop_assert_eq!(graph.flows(), flows);
    }
}
