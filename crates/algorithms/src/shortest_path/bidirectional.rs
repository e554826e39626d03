//! Bidirectional Dijkstra.

use pmgraph_graph::{DirectedGraph, NodeDescriptor, Weighted};
use pmgraph_tree::{Handle, PriorityQueue};

use super::UNREACHED;

/// Two alternating searches, one from the source over out-edges and one from
/// the target over in-edges.
///
/// The meeting distance is maintained on every relaxation: whenever an edge
/// `(u, v)` closes a forward/backward pair, `dist(u) + w + dist_back(v)` is
/// offered as the new best via-distance. The loop stops when the two queue
/// minima together exceed the best via-distance seen.
pub struct BidirectionalDijkstra<'a, G: DirectedGraph> {
    graph: &'a G,
    dist: Vec<u32>,
    dist_back: Vec<u32>,
    pred: Vec<Option<NodeDescriptor>>,
    succ: Vec<Option<NodeDescriptor>>,
    handle: Vec<Handle>,
    handle_back: Vec<Handle>,
    stamp: Vec<u32>,
    timestamp: u32,
    settled: usize,
    min_distance: u32,
    via: Option<G::NodeCursor>,
    pq_front: PriorityQueue<u32, G::NodeCursor>,
    pq_back: PriorityQueue<u32, G::NodeCursor>,
}

impl<'a, G> BidirectionalDijkstra<'a, G>
where
    G: DirectedGraph,
    G::EdgeData: Weighted,
{
    pub fn new(graph: &'a G) -> Self {
        BidirectionalDijkstra {
            graph,
            dist: Vec::new(),
            dist_back: Vec::new(),
            pred: Vec::new(),
            succ: Vec::new(),
            handle: Vec::new(),
            handle_back: Vec::new(),
            stamp: Vec::new(),
            timestamp: 0,
            settled: 0,
            min_distance: UNREACHED,
            via: None,
            pq_front: PriorityQueue::new(),
            pq_back: PriorityQueue::new(),
        }
    }

    fn ensure_scratch(&mut self) {
        let bound = self.graph.descriptor_bound();
        if self.dist.len() < bound {
            self.dist.resize(bound, 0);
            self.dist_back.resize(bound, 0);
            self.pred.resize(bound, None);
            self.succ.resize(bound, None);
            self.handle.resize_with(bound, Handle::new);
            self.handle_back.resize_with(bound, Handle::new);
            self.stamp.resize(bound, 0);
        }
    }

    fn slot(&self, u: G::NodeCursor) -> usize {
        self.graph.descriptor(u).index()
    }

    fn backward_found(&self, slot: usize) -> bool {
        self.stamp[slot] == self.timestamp && self.dist_back[slot] != UNREACHED
    }

    fn forward_found(&self, slot: usize) -> bool {
        self.stamp[slot] == self.timestamp && self.dist[slot] != UNREACHED
    }

    /// Nodes settled (popped from either queue) by the last query.
    #[must_use]
    pub fn settled_nodes(&self) -> usize {
        self.settled
    }

    pub fn run_query(&mut self, s: G::NodeCursor, t: G::NodeCursor) -> Option<u32> {
        if s == t {
            return Some(0);
        }
        self.ensure_scratch();
        self.pq_front.clear();
        self.pq_back.clear();
        self.timestamp += 1;
        self.settled = 0;
        self.min_distance = UNREACHED;
        self.via = None;

        let ss = self.slot(s);
        self.stamp[ss] = self.timestamp;
        self.dist[ss] = 0;
        self.dist_back[ss] = UNREACHED;
        self.pred[ss] = None;
        self.pq_front.insert(0, s, Some(&self.handle[ss]));

        let ts = self.slot(t);
        self.stamp[ts] = self.timestamp;
        self.dist[ts] = UNREACHED;
        self.dist_back[ts] = 0;
        self.succ[ts] = None;
        self.pq_back.insert(0, t, Some(&self.handle_back[ts]));

        while !(self.pq_front.is_empty() && self.pq_back.is_empty()) {
            let mut current_min = 0;
            if let Some(&k) = self.pq_front.min_key() {
                current_min += k;
            }
            if let Some(&k) = self.pq_back.min_key() {
                current_min += k;
            }
            if current_min > self.min_distance {
                break;
            }
            self.search_forward();
            self.search_backward();
        }

        let via = self.via?;
        let graph = self.graph;
        let mut total = self.dist[self.slot(via)];
        let mut u = via;
        while let Some(next) = self.succ[self.slot(u)] {
            let v = graph.resolve(next).expect("successor tree is current");
            let vs = self.slot(v);
            self.pred[vs] = Some(graph.descriptor(u));
            let e = graph.find_edge(u, v).expect("tree edge exists");
            total += graph.edge(e).weight();
            u = v;
        }
        Some(total)
    }

    fn search_forward(&mut self) {
        let graph = self.graph;
        let Some((du, u)) = self.pq_front.pop_min() else {
            return;
        };
        self.settled += 1;
        for e in graph.out_edges(u) {
            let v = graph.target(e);
            let vs = self.slot(v);
            let w = graph.edge(e).weight();
            let candidate = du + w;

            if self.stamp[vs] != self.timestamp {
                self.stamp[vs] = self.timestamp;
                self.pred[vs] = Some(graph.descriptor(u));
                self.dist[vs] = candidate;
                self.dist_back[vs] = UNREACHED;
                self.pq_front.insert(candidate, v, Some(&self.handle[vs]));
            } else if self.dist[vs] == UNREACHED {
                self.pred[vs] = Some(graph.descriptor(u));
                self.dist[vs] = candidate;
                self.pq_front.insert(candidate, v, Some(&self.handle[vs]));
            } else if self.dist[vs] > candidate {
                self.pred[vs] = Some(graph.descriptor(u));
                self.dist[vs] = candidate;
                self.pq_front.decrease(candidate, &self.handle[vs]);
            }

            if self.backward_found(vs) && candidate + self.dist_back[vs] < self.min_distance {
                self.min_distance = candidate + self.dist_back[vs];
                self.via = Some(v);
            }
        }
    }

    fn search_backward(&mut self) {
        let graph = self.graph;
        let Some((du, u)) = self.pq_back.pop_min() else {
            return;
        };
        self.settled += 1;
        for k in graph.in_edges(u) {
            let v = graph.source(k);
            let vs = self.slot(v);
            let w = graph.in_edge(k).weight();
            let candidate = du + w;

            if self.stamp[vs] != self.timestamp {
                self.stamp[vs] = self.timestamp;
                self.succ[vs] = Some(graph.descriptor(u));
                self.dist_back[vs] = candidate;
                self.dist[vs] = UNREACHED;
                self.pq_back.insert(candidate, v, Some(&self.handle_back[vs]));
            } else if self.dist_back[vs] == UNREACHED {
                self.succ[vs] = Some(graph.descriptor(u));
                self.dist_back[vs] = candidate;
                self.pq_back.insert(candidate, v, Some(&self.handle_back[vs]));
            } else if self.dist_back[vs] > candidate {
                self.succ[vs] = Some(graph.descriptor(u));
                self.dist_back[vs] = candidate;
                self.pq_back.decrease(candidate, &self.handle_back[vs]);
            }

            if self.forward_found(vs) && self.dist[vs] + w + du < self.min_distance {
                self.min_distance = self.dist[vs] + w + du;
                self.via = Some(v);
            }
        }
    }
}
