//! Min-cost max-flow solver.
//!
//! Successive shortest augmenting paths, with a label-correcting (SPFA)
//! search so that the negative costs of reverse edges are handled. Callers
//! only ever add edges with non-negative cost, which keeps the residual graph
//! free of negative cycles.
//!
//! Edges live in one flat arena; every forward edge at index `i` has its
//! reverse at `i ^ 1`.

use std::collections::VecDeque;

/// Capacity used for "no limit" edges.
pub const UNBOUNDED: i64 = 1 << 40;

/// Node index inside a [`FlowGraph`].
pub type NodeId = usize;

/// Handle to a forward edge returned by [`FlowGraph::add_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Position of the edge in the arena, usable to index [`FlowGraph::flows`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A directed edge.
#[derive(Debug, Clone)]
pub struct Edge<T> {
    /// Tail node.
    pub from: NodeId,
    /// Head node.
    pub to: NodeId,
    /// Maximum flow.
    pub capacity: i64,
    /// Current flow (negative on reverse edges carrying flow).
    pub flow: i64,
    /// Cost per unit of flow.
    pub cost: i64,
    /// Optional caller tag.
    pub tag: Option<T>,
}

impl<T> Edge<T> {
    /// Capacity left for more flow.
    #[must_use]
    pub const fn residual(&self) -> i64 {
        self.capacity - self.flow
    }

    /// Whether the edge carries as much flow as it can.
    #[must_use]
    pub const fn is_saturated(&self) -> bool {
        self.capacity > 0 && self.flow >= self.capacity
    }
}

/// Totals of a completed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowOutcome {
    /// Total cost of the flow.
    pub cost: i64,
    /// Total flow pushed from source to sink.
    pub flow: i64,
}

/// A flow network with a source and a sink.
///
/// `T` is the tag type attached to edges; routing tags source edges with
/// the unit they belong to.
#[derive(Debug, Clone)]
pub struct FlowGraph<T = ()> {
    edges: Vec<Edge<T>>,
    adjacency: Vec<Vec<usize>>,
    source: NodeId,
    sink: NodeId,
}

impl<T> FlowGraph<T> {
    /// Create a graph with `nodes` regular nodes plus a source and a sink.
    ///
    /// Regular nodes are `0..nodes`; the source is `nodes` and the sink
    /// `nodes + 1`.
    #[must_use]
    pub fn new(nodes: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); nodes + 2],
            source: nodes,
            sink: nodes + 1,
        }
    }

    /// The source node.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// The sink node.
    #[must_use]
    pub const fn sink(&self) -> NodeId {
        self.sink
    }

    /// Total node count including source and sink.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of forward edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Add a forward edge and its zero-capacity reverse twin.
    ///
    /// `cost` must be non-negative; a negative forward cost could create a
    /// negative cycle the search cannot handle.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: i64, cost: i64) -> EdgeId {
        debug_assert!(cost >= 0, "forward edge {from}->{to} has negative cost {cost}");
        debug_assert!(capacity >= 0, "forward edge {from}->{to} has negative capacity");

        let id = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            capacity,
            flow: 0,
            cost,
            tag: None,
        });
        self.edges.push(Edge {
            from: to,
            to: from,
            capacity: 0,
            flow: 0,
            cost: -cost,
            tag: None,
        });
        self.adjacency[from].push(id);
        self.adjacency[to].push(id + 1);
        EdgeId(id)
    }

    /// Add an edge carrying a tag.
    pub fn add_tagged_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        capacity: i64,
        cost: i64,
        tag: T,
    ) -> EdgeId {
        let id = self.add_edge(from, to, capacity, cost);
        self.edges[id.0].tag = Some(tag);
        id
    }

    /// Look up an edge.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge<T> {
        &self.edges[id.0]
    }

    /// Flow currently on an edge.
    #[must_use]
    pub fn flow(&self, id: EdgeId) -> i64 {
        self.edges[id.0].flow
    }

    /// Forward edges leaving `node`, in insertion order.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge<T>)> {
        self.adjacency[node]
            .iter()
            .filter(|&&idx| idx % 2 == 0)
            .map(|&idx| (EdgeId(idx), &self.edges[idx]))
    }

    /// Every forward edge in insertion order.
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<T>)> {
        self.edges
            .iter()
            .enumerate()
            .step_by(2)
            .map(|(idx, edge)| (EdgeId(idx), edge))
    }

    /// Snapshot of every edge's flow, indexed by [`EdgeId::index`].
    ///
    /// Decoders consume this copy while walking paths so that units sharing
    /// an edge each take their own unit of flow.
    #[must_use]
    pub fn flows(&self) -> Vec<i64> {
        self.edges.iter().map(|edge| edge.flow).collect()
    }

    /// The reverse twin of an edge.
    #[must_use]
    pub fn reverse(&self, id: EdgeId) -> &Edge<T> {
        &self.edges[id.0 ^ 1]
    }

    /// Push as much flow as possible from source to sink at minimum cost.
    ///
    /// Always terminates; a graph without any source-to-sink path yields a
    /// zero outcome.
    pub fn solve(&mut self) -> FlowOutcome {
        let mut outcome = FlowOutcome::default();
        let mut search = PathSearch::new(self.node_count());

        while search.run(self) {
            let pushed = search.bottleneck[self.sink];
            let mut node = self.sink;
            while let Some(idx) = search.parent[node] {
                self.edges[idx].flow += pushed;
                self.edges[idx ^ 1].flow = -self.edges[idx].flow;
                outcome.cost += self.edges[idx].cost * pushed;
                node = self.edges[idx].from;
            }
            outcome.flow += pushed;
        }

        outcome
    }
}

/// Scratch space of the shortest-path search, reused between augmentations.
struct PathSearch {
    distance: Vec<i64>,
    bottleneck: Vec<i64>,
    parent: Vec<Option<usize>>,
    queued: Vec<bool>,
    queue: VecDeque<NodeId>,
}

impl PathSearch {
    fn new(nodes: usize) -> Self {
        Self {
            distance: vec![i64::MAX; nodes],
            bottleneck: vec![0; nodes],
            parent: vec![None; nodes],
            queued: vec![false; nodes],
            queue: VecDeque::new(),
        }
    }

    /// Find a cheapest augmenting path. Returns `false` when the sink is unreachable.
    fn run<T>(&mut self, graph: &FlowGraph<T>) -> bool {
        self.distance.fill(i64::MAX);
        self.parent.fill(None);
        self.queued.fill(false);

        self.distance[graph.source] = 0;
        self.bottleneck[graph.source] = i64::MAX;
        self.queue.push_back(graph.source);
        self.queued[graph.source] = true;

        while let Some(node) = self.queue.pop_front() {
            self.queued[node] = false;
            let base = self.distance[node];
            for &idx in &graph.adjacency[node] {
                let edge = &graph.edges[idx];
                if edge.residual() <= 0 {
                    continue;
                }
                let candidate = base + edge.cost;
                if candidate < self.distance[edge.to] {
                    self.distance[edge.to] = candidate;
                    self.parent[edge.to] = Some(idx);
                    self.bottleneck[edge.to] = self.bottleneck[node].min(edge.residual());
                    if !self.queued[edge.to] {
                        self.queued[edge.to] = true;
                        self.queue.push_back(edge.to);
                    }
                }
            }
        }

        self.distance[graph.sink] != i64::MAX
    }
}
