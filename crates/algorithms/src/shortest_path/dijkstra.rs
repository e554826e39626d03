//! Plain and backward Dijkstra.

use pmgraph_graph::{DirectedGraph, NodeDescriptor, NodeSelection, Weighted};
use pmgraph_tree::{Handle, PriorityQueue};

/// Label-setting shortest paths over out-edges.
pub struct Dijkstra<'a, G: DirectedGraph> {
    graph: &'a G,
    dist: Vec<u32>,
    pred: Vec<Option<NodeDescriptor>>,
    handle: Vec<Handle>,
    stamp: Vec<u32>,
    timestamp: u32,
    settled: usize,
    pq: PriorityQueue<u32, G::NodeCursor>,
}

impl<'a, G> Dijkstra<'a, G>
where
    G: DirectedGraph,
    G::EdgeData: Weighted,
{
    pub fn new(graph: &'a G) -> Self {
        Dijkstra {
            graph,
            dist: Vec::new(),
            pred: Vec::new(),
            handle: Vec::new(),
            stamp: Vec::new(),
            timestamp: 0,
            settled: 0,
            pq: PriorityQueue::new(),
        }
    }

    fn ensure_scratch(&mut self) {
        let bound = self.graph.descriptor_bound();
        if self.dist.len() < bound {
            self.dist.resize(bound, 0);
            self.pred.resize(bound, None);
            self.handle.resize_with(bound, Handle::new);
            self.stamp.resize(bound, 0);
        }
    }

    fn slot(&self, u: G::NodeCursor) -> usize {
        self.graph.descriptor(u).index()
    }

    fn start(&mut self, s: G::NodeCursor) {
        self.ensure_scratch();
        self.pq.clear();
        self.timestamp += 1;
        self.settled = 0;
        let ss = self.slot(s);
        self.dist[ss] = 0;
        self.pred[ss] = None;
        self.stamp[ss] = self.timestamp;
        self.pq.insert(0, s, Some(&self.handle[ss]));
    }

    fn relax_out_edges(&mut self, u: G::NodeCursor, du: u32) {
        let graph = self.graph;
        for e in graph.out_edges(u) {
            let v = graph.target(e);
            let vs = self.slot(v);
            let candidate = du + graph.edge(e).weight();
            if self.stamp[vs] != self.timestamp {
                self.stamp[vs] = self.timestamp;
                self.dist[vs] = candidate;
                self.pred[vs] = Some(graph.descriptor(u));
                self.pq.insert(candidate, v, Some(&self.handle[vs]));
            } else if self.dist[vs] > candidate {
                self.dist[vs] = candidate;
                self.pred[vs] = Some(graph.descriptor(u));
                self.pq.decrease(candidate, &self.handle[vs]);
            }
        }
    }

    /// Shortest distance from `s` to `t`, settling only what the search
    /// reaches before `t` comes off the queue.
    pub fn run_query(&mut self, s: G::NodeCursor, t: G::NodeCursor) -> Option<u32> {
        self.start(s);
        while let Some((du, u)) = self.pq.pop_min() {
            self.settled += 1;
            if u == t {
                return Some(du);
            }
            self.relax_out_edges(u, du);
        }
        None
    }

    /// Shortest-path tree from `s`, run to exhaustion.
    pub fn build_tree(&mut self, s: G::NodeCursor) {
        self.start(s);
        while let Some((du, u)) = self.pq.pop_min() {
            self.settled += 1;
            self.relax_out_edges(u, du);
        }
    }

    /// Like [`Self::build_tree`], stopping once every selected target has
    /// been settled.
    pub fn build_sub_tree(&mut self, s: G::NodeCursor, targets: &NodeSelection) {
        self.start(s);
        let mut remaining = targets.len();
        while let Some((du, u)) = self.pq.pop_min() {
            self.settled += 1;
            if targets.is_member(self.graph.descriptor(u)) {
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
            self.relax_out_edges(u, du);
        }
    }

    /// Nodes settled by the last run.
    #[must_use]
    pub fn settled_nodes(&self) -> usize {
        self.settled
    }

    /// Distance found by the last run, if the node was reached.
    #[must_use]
    pub fn distance(&self, u: G::NodeCursor) -> Option<u32> {
        let slot = self.slot(u);
        (self.stamp[slot] == self.timestamp).then(|| self.dist[slot])
    }

    /// Predecessor on the shortest path found by the last run; `None` for
    /// the source or an unreached node.
    #[must_use]
    pub fn predecessor(&self, u: G::NodeCursor) -> Option<NodeDescriptor> {
        let slot = self.slot(u);
        if self.stamp[slot] == self.timestamp {
            self.pred[slot]
        } else {
            None
        }
    }
}

/// Dijkstra over in-edges, building trees rooted at the target.
pub struct BackwardDijkstra<'a, G: DirectedGraph> {
    graph: &'a G,
    dist_back: Vec<u32>,
    succ: Vec<Option<NodeDescriptor>>,
    pred: Vec<Option<NodeDescriptor>>,
    handle_back: Vec<Handle>,
    stamp: Vec<u32>,
    timestamp: u32,
    pq_back: PriorityQueue<u32, G::NodeCursor>,
}

impl<'a, G> BackwardDijkstra<'a, G>
where
    G: DirectedGraph,
    G::EdgeData: Weighted,
{
    pub fn new(graph: &'a G) -> Self {
        BackwardDijkstra {
            graph,
            dist_back: Vec::new(),
            succ: Vec::new(),
            pred: Vec::new(),
            handle_back: Vec::new(),
            stamp: Vec::new(),
            timestamp: 0,
            pq_back: PriorityQueue::new(),
        }
    }

    fn ensure_scratch(&mut self) {
        let bound = self.graph.descriptor_bound();
        if self.dist_back.len() < bound {
            self.dist_back.resize(bound, 0);
            self.succ.resize(bound, None);
            self.pred.resize(bound, None);
            self.handle_back.resize_with(bound, Handle::new);
            self.stamp.resize(bound, 0);
        }
    }

    fn slot(&self, u: G::NodeCursor) -> usize {
        self.graph.descriptor(u).index()
    }

    fn start(&mut self, t: G::NodeCursor) {
        self.ensure_scratch();
        self.pq_back.clear();
        self.timestamp += 1;
        let ts = self.slot(t);
        self.dist_back[ts] = 0;
        self.succ[ts] = None;
        self.stamp[ts] = self.timestamp;
        self.pq_back.insert(0, t, Some(&self.handle_back[ts]));
    }

    fn relax_in_edges(&mut self, u: G::NodeCursor, du: u32) {
        let graph = self.graph;
        for k in graph.in_edges(u) {
            let v = graph.source(k);
            let vs = self.slot(v);
            let candidate = du + graph.in_edge(k).weight();
            if self.stamp[vs] != self.timestamp {
                self.stamp[vs] = self.timestamp;
                self.dist_back[vs] = candidate;
                self.succ[vs] = Some(graph.descriptor(u));
                self.pq_back.insert(candidate, v, Some(&self.handle_back[vs]));
            } else if self.dist_back[vs] > candidate {
                self.dist_back[vs] = candidate;
                self.succ[vs] = Some(graph.descriptor(u));
                self.pq_back.decrease(candidate, &self.handle_back[vs]);
            }
        }
    }

    /// Backward shortest-path tree rooted at `t`.
    pub fn build_tree(&mut self, t: G::NodeCursor) {
        self.start(t);
        while let Some((du, u)) = self.pq_back.pop_min() {
            self.relax_in_edges(u, du);
        }
    }

    /// Distance from `s` to `t` found by searching backward from `t`. The
    /// forward predecessor chain is reconstructed from the successor tree,
    /// re-accumulating the edge weights along it.
    pub fn run_query(&mut self, s: G::NodeCursor, t: G::NodeCursor) -> Option<u32> {
        self.start(t);
        while let Some((du, u)) = self.pq_back.pop_min() {
            if u == s {
                break;
            }
            self.relax_in_edges(u, du);
        }

        if self.stamp[self.slot(s)] != self.timestamp {
            return None;
        }
        let graph = self.graph;
        let mut total = 0;
        let mut u = s;
        while let Some(next) = self.succ[self.slot(u)] {
            let v = graph.resolve(next).expect("successor tree is current");
            let e = graph.find_edge(u, v).expect("tree edge exists");
            total += graph.edge(e).weight();
            let vs = self.slot(v);
            self.pred[vs] = Some(graph.descriptor(u));
            u = v;
        }
        Some(total)
    }

    /// Backward distance (towards the tree root) of the last run.
    #[must_use]
    pub fn distance_back(&self, u: G::NodeCursor) -> Option<u32> {
        let slot = self.slot(u);
        (self.stamp[slot] == self.timestamp).then(|| self.dist_back[slot])
    }

    /// Successor towards the tree root.
    #[must_use]
    pub fn successor(&self, u: G::NodeCursor) -> Option<NodeDescriptor> {
        let slot = self.slot(u);
        if self.stamp[slot] == self.timestamp {
            self.succ[slot]
        } else {
            None
        }
    }
}
