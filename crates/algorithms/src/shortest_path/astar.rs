//! Goal-directed search with Euclidean potentials.

use pmgraph_graph::{DirectedGraph, Located, NodeDescriptor, Weighted};
use pmgraph_tree::{Handle, PriorityQueue};

use crate::geometry::euclidean;

/// A* with admissible potentials derived from coordinates.
///
/// Construction scans the graph once for the highest observed "speed"
/// (Euclidean length over weight); dividing distances to the target by it
/// keeps the potential at or below the true remaining cost. The search runs
/// on reduced costs `w(e) - pot(u) + pot(v)` and re-accumulates the real
/// weights along the predecessor chain at the end.
pub struct AStar<'a, G: DirectedGraph> {
    graph: &'a G,
    max_speed: f64,
    dist: Vec<u32>,
    pred: Vec<Option<NodeDescriptor>>,
    handle: Vec<Handle>,
    stamp: Vec<u32>,
    timestamp: u32,
    settled: usize,
    pq: PriorityQueue<u32, G::NodeCursor>,
}

impl<'a, G> AStar<'a, G>
where
    G: DirectedGraph,
    G::NodeData: Located,
    G::EdgeData: Weighted,
{
    pub fn new(graph: &'a G) -> Self {
        let mut max_speed = 0.0_f64;
        for u in graph.nodes() {
            let nu = graph.node(u);
            for e in graph.out_edges(u) {
                let w = graph.edge(e).weight();
                if w == 0 {
                    continue;
                }
                let nv = graph.node(graph.target(e));
                let speed = euclidean(nu.x(), nu.y(), nv.x(), nv.y()) / f64::from(w);
                if speed > max_speed {
                    max_speed = speed;
                }
            }
        }
        AStar {
            graph,
            max_speed,
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

    /// Lower bound on the distance from `u` to `t`.
    #[must_use]
    pub fn potential(&self, u: G::NodeCursor, t: G::NodeCursor) -> u32 {
        if self.max_speed <= 0.0 {
            return 0;
        }
        let nu = self.graph.node(u);
        let nt = self.graph.node(t);
        (euclidean(nu.x(), nu.y(), nt.x(), nt.y()) / self.max_speed) as u32
    }

    /// Every reduced cost is non-negative towards `t`.
    #[must_use]
    pub fn has_feasible_potentials(&self, t: G::NodeCursor) -> bool {
        for u in self.graph.nodes() {
            let pot_u = self.potential(u, t);
            for e in self.graph.out_edges(u) {
                let v = self.graph.target(e);
                let pot_v = self.potential(v, t);
                if i64::from(self.graph.edge(e).weight()) - i64::from(pot_u) + i64::from(pot_v) < 0
                {
                    return false;
                }
            }
        }
        true
    }

    #[must_use]
    pub fn settled_nodes(&self) -> usize {
        self.settled
    }

    pub fn run_query(&mut self, s: G::NodeCursor, t: G::NodeCursor) -> Option<u32> {
        debug_assert!(self.has_feasible_potentials(t));
        self.ensure_scratch();
        self.pq.clear();
        self.timestamp += 1;
        self.settled = 0;

        let graph = self.graph;
        let ss = self.slot(s);
        self.dist[ss] = 0;
        self.pred[ss] = None;
        self.stamp[ss] = self.timestamp;
        self.pq.insert(0, s, Some(&self.handle[ss]));

        let mut reached = false;
        while let Some((_, u)) = self.pq.pop_min() {
            self.settled += 1;
            if u == t {
                reached = true;
                break;
            }
            let du = self.dist[self.slot(u)];
            let pot_u = self.potential(u, t);
            for e in graph.out_edges(u) {
                let v = graph.target(e);
                let vs = self.slot(v);
                let pot_v = self.potential(v, t);
                let reduced = graph.edge(e).weight() + pot_v - pot_u;
                let candidate = du + reduced;

                if self.stamp[vs] != self.timestamp {
                    self.stamp[vs] = self.timestamp;
                    self.pred[vs] = Some(graph.descriptor(u));
                    self.dist[vs] = candidate;
                    self.pq.insert(candidate, v, Some(&self.handle[vs]));
                } else if self.dist[vs] > candidate {
                    self.pred[vs] = Some(graph.descriptor(u));
                    self.dist[vs] = candidate;
                    self.pq.decrease(candidate, &self.handle[vs]);
                }
            }
        }
        if !reached {
            return None;
        }

        // Undo the reduction by walking the real weights back to the source.
        let mut total = 0;
        let mut u = t;
        while let Some(prev) = self.pred[self.slot(u)] {
            let v = graph.resolve(prev).expect("predecessor tree is current");
            let e = graph.find_edge(v, u).expect("tree edge exists");
            total += graph.edge(e).weight();
            u = v;
        }
        Some(total)
    }
}
