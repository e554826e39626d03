//! Heuristic suppliers for [`super::NamoaStar`].

use std::marker::PhantomData;

use pmgraph_graph::{DirectedGraph, Located};
use pmgraph_tree::{Handle, PriorityQueue};

use super::{CriteriaList, Heuristic, MultiWeighted};
use crate::geometry::{great_circle, COORD_SCALE};

/// No guidance: h ≡ 0 reduces NAMOA* to plain multi-objective
/// label-setting.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlindHeuristic;

impl<G: DirectedGraph> Heuristic<G> for BlindHeuristic {
    fn prepare(
        &mut self,
        graph: &G,
        _s: G::NodeCursor,
        _t: G::NodeCursor,
        arity: usize,
        table: &mut [CriteriaList],
    ) {
        for u in graph.nodes() {
            table[graph.descriptor(u).index()] = CriteriaList::zeros(arity);
        }
    }
}

/// Geographic lower bounds: the first component is the great-circle
/// distance to the target, the remaining components divide it by the best
/// observed ratio between the first criterion and theirs.
pub struct GreatCircleHeuristic {
    speeds: Option<Vec<f64>>,
}

impl GreatCircleHeuristic {
    #[must_use]
    pub fn new() -> Self {
        GreatCircleHeuristic { speeds: None }
    }
}

impl Default for GreatCircleHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Heuristic<G> for GreatCircleHeuristic
where
    G: DirectedGraph,
    G::NodeData: Located,
    G::EdgeData: MultiWeighted,
{
    fn prepare(
        &mut self,
        graph: &G,
        _s: G::NodeCursor,
        t: G::NodeCursor,
        arity: usize,
        table: &mut [CriteriaList],
    ) {
        let speeds = self.speeds.get_or_insert_with(|| {
            let mut speeds = vec![0.0_f64; arity];
            for u in graph.nodes() {
                for e in graph.out_edges(u) {
                    let criteria = graph.edge(e).criteria();
                    for (i, speed) in speeds.iter_mut().enumerate().skip(1) {
                        if criteria[i] > 0 {
                            let ratio = f64::from(criteria[0]) / f64::from(criteria[i]);
                            if ratio > *speed {
                                *speed = ratio;
                            }
                        }
                    }
                }
            }
            speeds
        });

        let nt = graph.node(t);
        let (tx, ty) = (
            f64::from(nt.x()) / COORD_SCALE,
            f64::from(nt.y()) / COORD_SCALE,
        );
        for u in graph.nodes() {
            let nu = graph.node(u);
            let h0 = great_circle(
                f64::from(nu.x()) / COORD_SCALE,
                f64::from(nu.y()) / COORD_SCALE,
                tx,
                ty,
            );
            let mut components = vec![h0 as u32; arity];
            for (i, component) in components.iter_mut().enumerate().skip(1) {
                *component = if speeds[i] > 0.0 {
                    (h0 / speeds[i]) as u32
                } else {
                    0
                };
            }
            table[graph.descriptor(u).index()] = CriteriaList::from(components);
        }
    }
}

/// Tight per-criterion lower bounds: one full backward Dijkstra from the
/// target per criterion. Nodes that cannot reach the target keep the
/// `u32::MAX` sentinel.
pub struct TcHeuristic<G: DirectedGraph> {
    stamp: Vec<u32>,
    timestamp: u32,
    handle: Vec<Handle>,
    pq: PriorityQueue<u32, G::NodeCursor>,
    _graph: PhantomData<fn() -> G>,
}

impl<G: DirectedGraph> TcHeuristic<G> {
    #[must_use]
    pub fn new() -> Self {
        TcHeuristic {
            stamp: Vec::new(),
            timestamp: 0,
            handle: Vec::new(),
            pq: PriorityQueue::new(),
            _graph: PhantomData,
        }
    }

    fn ensure_scratch(&mut self, bound: usize) {
        if self.stamp.len() < bound {
            self.stamp.resize(bound, 0);
            self.handle.resize_with(bound, Handle::new);
        }
    }
}

impl<G: DirectedGraph> Default for TcHeuristic<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Heuristic<G> for TcHeuristic<G>
where
    G: DirectedGraph,
    G::EdgeData: MultiWeighted,
{
    fn prepare(
        &mut self,
        graph: &G,
        _s: G::NodeCursor,
        t: G::NodeCursor,
        arity: usize,
        table: &mut [CriteriaList],
    ) {
        self.ensure_scratch(graph.descriptor_bound());
        for u in graph.nodes() {
            let entry = &mut table[graph.descriptor(u).index()];
            *entry = CriteriaList::zeros(arity);
            entry.fill(u32::MAX);
        }

        for criterion in 0..arity {
            self.timestamp += 1;
            self.pq.clear();

            let ts = graph.descriptor(t).index();
            table[ts][criterion] = 0;
            self.stamp[ts] = self.timestamp;
            self.pq.insert(0, t, Some(&self.handle[ts]));

            while let Some((du, u)) = self.pq.pop_min() {
                for k in graph.in_edges(u) {
                    let v = graph.source(k);
                    let vs = graph.descriptor(v).index();
                    let candidate = du + graph.in_edge(k).criteria()[criterion];
                    if self.stamp[vs] != self.timestamp {
                        self.stamp[vs] = self.timestamp;
                        table[vs][criterion] = candidate;
                        self.pq.insert(candidate, v, Some(&self.handle[vs]));
                    } else if table[vs][criterion] > candidate {
                        table[vs][criterion] = candidate;
                        self.pq.decrease(candidate, &self.handle[vs]);
                    }
                }
            }
        }
    }
}

/// Two-criterion variant of [`TcHeuristic`] that bounds the backward trees
/// by a quick criterion-0 query, so preprocessing touches only the corridor
/// that can matter for the query at hand.
pub struct BoundedTcHeuristic<G: DirectedGraph> {
    stamp: Vec<u32>,
    timestamp: u32,
    marked: Vec<u32>,
    mark: u32,
    settled0: Vec<u32>,
    settled1: Vec<u32>,
    dist: Vec<u32>,
    handle: Vec<Handle>,
    handle_secondary: Vec<Handle>,
    pq: PriorityQueue<u32, G::NodeCursor>,
    secondary_pq: PriorityQueue<u32, G::NodeCursor>,
    _graph: PhantomData<fn() -> G>,
}

impl<G: DirectedGraph> BoundedTcHeuristic<G> {
    #[must_use]
    pub fn new() -> Self {
        BoundedTcHeuristic {
            stamp: Vec::new(),
            timestamp: 0,
            marked: Vec::new(),
            mark: 0,
            settled0: Vec::new(),
            settled1: Vec::new(),
            dist: Vec::new(),
            handle: Vec::new(),
            handle_secondary: Vec::new(),
            pq: PriorityQueue::new(),
            secondary_pq: PriorityQueue::new(),
            _graph: PhantomData,
        }
    }

    fn ensure_scratch(&mut self, bound: usize) {
        if self.stamp.len() < bound {
            self.stamp.resize(bound, 0);
            self.marked.resize(bound, 0);
            self.settled0.resize(bound, 0);
            self.settled1.resize(bound, 0);
            self.dist.resize(bound, 0);
            self.handle.resize_with(bound, Handle::new);
            self.handle_secondary.resize_with(bound, Handle::new);
        }
    }
}

impl<G: DirectedGraph> Default for BoundedTcHeuristic<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Heuristic<G> for BoundedTcHeuristic<G>
where
    G: DirectedGraph,
    G::EdgeData: MultiWeighted,
{
    fn prepare(
        &mut self,
        graph: &G,
        s: G::NodeCursor,
        t: G::NodeCursor,
        arity: usize,
        table: &mut [CriteriaList],
    ) {
        debug_assert_eq!(arity, 2, "the bounded heuristic is two-criterion");
        self.ensure_scratch(graph.descriptor_bound());
        for u in graph.nodes() {
            let entry = &mut table[graph.descriptor(u).index()];
            *entry = CriteriaList::zeros(arity);
            entry.fill(u32::MAX);
        }
        let slot = |u: G::NodeCursor| graph.descriptor(u).index();

        // Phase 1: backward criterion-0 query towards `s`, carrying the full
        // vectors along criterion-0-optimal paths.
        self.timestamp += 1;
        self.pq.clear();
        let ts = slot(t);
        table[ts] = CriteriaList::zeros(arity);
        self.stamp[ts] = self.timestamp;
        self.pq.insert(0, t, Some(&self.handle[ts]));

        loop {
            match self.pq.min_item() {
                None => break,
                Some(&u) if u == s => break,
                _ => {}
            }
            let (du, u) = self.pq.pop_min().expect("queue is non-empty");
            let us = slot(u);
            self.settled0[us] = self.timestamp;
            debug_assert_eq!(du, table[us][0]);
            for k in graph.in_edges(u) {
                let v = graph.source(k);
                let vs = slot(v);
                let criteria = graph.in_edge(k).criteria();
                let candidate = table[us][0] + criteria[0];
                if self.stamp[vs] != self.timestamp {
                    self.stamp[vs] = self.timestamp;
                    table[vs] = table[us].plus(criteria);
                    self.pq.insert(candidate, v, Some(&self.handle[vs]));
                } else if table[vs][0] > candidate {
                    table[vs] = table[us].plus(criteria);
                    self.pq.decrease(candidate, &self.handle[vs]);
                }
            }
        }
        if self.stamp[slot(s)] != self.timestamp {
            // Target unreachable from the source; leave every bound
            // saturated and let the search return empty.
            return;
        }
        let bound1 = table[slot(s)][1];

        // Phase 2: bounded backward criterion-1 tree, refining the second
        // component to the true distance and recording the criterion-0 cost
        // of the criterion-1-optimal paths.
        self.mark += 1;
        self.secondary_pq.clear();
        table[ts][1] = 0;
        self.dist[ts] = 0;
        self.marked[ts] = self.mark;
        self.secondary_pq.insert(0, t, Some(&self.handle_secondary[ts]));

        while let Some(&key) = self.secondary_pq.min_key() {
            if key > bound1 {
                break;
            }
            let (_, u) = self.secondary_pq.pop_min().expect("queue is non-empty");
            let us = slot(u);
            self.settled1[us] = self.mark;
            for k in graph.in_edges(u) {
                let v = graph.source(k);
                let vs = slot(v);
                let criteria = graph.in_edge(k).criteria();
                let candidate = table[us][1] + criteria[1];
                if self.marked[vs] != self.mark {
                    self.marked[vs] = self.mark;
                    table[vs][1] = candidate;
                    self.dist[vs] = self.dist[us] + criteria[0];
                    self.secondary_pq
                        .insert(candidate, v, Some(&self.handle_secondary[vs]));
                } else if table[vs][1] > candidate {
                    table[vs][1] = candidate;
                    self.dist[vs] = self.dist[us] + criteria[0];
                    self.secondary_pq.decrease(candidate, &self.handle_secondary[vs]);
                }
            }
        }
        debug_assert_eq!(self.marked[slot(s)], self.mark);
        let bound0 = self.dist[slot(s)];

        // Phase 3: continue the phase-1 queue, now refining only the first
        // component, out to the criterion-0 cost of the best criterion-1
        // path.
        while let Some(&key) = self.pq.min_key() {
            if key > bound0 {
                break;
            }
            let (_, u) = self.pq.pop_min().expect("queue is non-empty");
            let us = slot(u);
            self.settled0[us] = self.timestamp;
            for k in graph.in_edges(u) {
                let v = graph.source(k);
                let vs = slot(v);
                let criteria = graph.in_edge(k).criteria();
                let candidate = table[us][0] + criteria[0];
                if self.stamp[vs] != self.timestamp {
                    self.stamp[vs] = self.timestamp;
                    table[vs][0] = candidate;
                    self.pq.insert(candidate, v, Some(&self.handle[vs]));
                } else if table[vs][0] > candidate {
                    table[vs][0] = candidate;
                    self.pq.decrease(candidate, &self.handle[vs]);
                }
            }
        }

        // Only nodes whose bounds are exact in both components stay finite:
        // everything else lies outside every Pareto-optimal corridor and is
        // excluded from the search via the saturation sentinel.
        for u in graph.nodes() {
            let us = slot(u);
            if self.settled0[us] != self.timestamp || self.settled1[us] != self.mark {
                table[us].fill(u32::MAX);
            }
        }
    }
}
