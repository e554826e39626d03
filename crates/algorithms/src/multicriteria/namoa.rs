//! NAMOA*-style multi-criteria search with pluggable heuristics.

use pmgraph_graph::{DirectedGraph, Located};
use pmgraph_tree::{Handle, PriorityQueue};

use super::{ArcFlags, CriteriaList, McLabel, MultiWeighted};

/// Per-node lower-bound vectors on the remaining cost to the target.
///
/// `prepare` runs once per query and fills `table` (indexed by descriptor
/// index) with one vector per node. A component of `u32::MAX` marks a node
/// that provably cannot reach the target on that criterion; the search skips
/// such nodes entirely.
pub trait Heuristic<G: DirectedGraph> {
    fn prepare(
        &mut self,
        graph: &G,
        s: G::NodeCursor,
        t: G::NodeCursor,
        arity: usize,
        table: &mut [CriteriaList],
    );
}

/// Multi-objective A*: label-setting over Pareto frontiers, expanding in
/// lexicographic order of `g + h` and pruning against the target's closed
/// labels.
pub struct NamoaStar<'a, G: DirectedGraph, H> {
    graph: &'a G,
    heuristic: H,
    arity: usize,
    labels: Vec<Vec<McLabel>>,
    stamp: Vec<u32>,
    timestamp: u32,
    potentials: Vec<CriteriaList>,
    generated: usize,
    pq: PriorityQueue<CriteriaList, G::NodeCursor>,
}

impl<'a, G, H> NamoaStar<'a, G, H>
where
    G: DirectedGraph,
    G::EdgeData: MultiWeighted,
    H: Heuristic<G>,
{
    pub fn new(graph: &'a G, arity: usize, heuristic: H) -> Self {
        NamoaStar {
            graph,
            heuristic,
            arity,
            labels: Vec::new(),
            stamp: Vec::new(),
            timestamp: 0,
            potentials: Vec::new(),
            generated: 0,
            pq: PriorityQueue::new(),
        }
    }

    fn ensure_scratch(&mut self) {
        let bound = self.graph.descriptor_bound();
        if self.labels.len() < bound {
            self.labels.resize_with(bound, Vec::new);
            self.stamp.resize(bound, 0);
            self.potentials
                .resize_with(bound, || CriteriaList::zeros(self.arity));
        }
    }

    fn slot(&self, u: G::NodeCursor) -> usize {
        self.graph.descriptor(u).index()
    }

    /// Every edge between non-excluded nodes satisfies `h(u) <= c(e) +
    /// h(v)` component-wise. Saturated nodes are excluded from the search,
    /// so their bounds carry no obligation.
    #[must_use]
    pub fn has_feasible_potentials(&self, _t: G::NodeCursor) -> bool {
        for u in self.graph.nodes() {
            let h_u = &self.potentials[self.slot(u)];
            if h_u.is_saturated() {
                continue;
            }
            for e in self.graph.out_edges(u) {
                let v = self.graph.target(e);
                let h_v = &self.potentials[self.slot(v)];
                if h_v.is_saturated() {
                    continue;
                }
                if !h_u.dominates(&self.graph.edge(e).criteria().plus(h_v)) {
                    return false;
                }
            }
        }
        true
    }

    pub fn run_query(&mut self, s: G::NodeCursor, t: G::NodeCursor) {
        self.run(s, t, None);
    }

    /// As [`Self::run_query`], exploring only edges whose arc flags admit
    /// the target's partition cell.
    pub fn run_query_with_flags(&mut self, s: G::NodeCursor, t: G::NodeCursor, flags: &ArcFlags)
    where
        G::NodeData: Located,
    {
        let node = self.graph.node(t);
        let mask = flags
            .partition()
            .on_mask(flags.partition().cell(node.x(), node.y()));
        self.run(s, t, Some(mask));
    }

    fn run(&mut self, s: G::NodeCursor, t: G::NodeCursor, mask: Option<u32>) {
        self.ensure_scratch();
        let graph = self.graph;
        {
            // Split the borrow: the heuristic writes the potential table.
            let potentials = &mut self.potentials;
            self.heuristic.prepare(graph, s, t, self.arity, potentials);
        }
        debug_assert!(self.has_feasible_potentials(t));

        self.timestamp += 1;
        self.pq.clear();
        self.generated = 1;

        let ss = self.slot(s);
        let h_s = self.potentials[ss].clone();
        self.stamp[ss] = self.timestamp;
        self.labels[ss].clear();
        if h_s.is_saturated() {
            return;
        }
        let handle = Handle::new();
        self.labels[ss].push(McLabel {
            criteria: CriteriaList::zeros(self.arity),
            pred: None,
            handle: Some(handle.clone()),
        });
        self.pq
            .insert(CriteriaList::zeros(self.arity).plus(&h_s), s, Some(&handle));

        while let Some((min_criteria, u)) = self.pq.pop_min() {
            let us = self.slot(u);
            let g_u = min_criteria.minus(&self.potentials[us]);

            if u == t {
                self.erase_all_dominated(t, &g_u);
            }
            self.move_to_closed(&g_u, u);
            if self.dominated_at(t, &min_criteria) {
                continue;
            }

            for e in graph.out_edges(u) {
                if let Some(m) = mask {
                    if graph.edge(e).flags() & m == 0 {
                        continue;
                    }
                }
                let v = graph.target(e);
                let vs = self.slot(v);
                if self.stamp[vs] != self.timestamp {
                    self.stamp[vs] = self.timestamp;
                    self.labels[vs].clear();
                }
                if self.potentials[vs].is_saturated() {
                    continue;
                }
                let g_v = g_u.plus(graph.edge(e).criteria());
                let f_v = g_v.plus(&self.potentials[vs]);

                if self.labels[vs].iter().any(|l| l.criteria == g_v) {
                    // Equal-cost alternative: track the path, skip the queue.
                    self.labels[vs].push(McLabel {
                        criteria: g_v,
                        pred: Some(graph.descriptor(u)),
                        handle: None,
                    });
                    self.generated += 1;
                } else {
                    if self.labels[vs].iter().any(|l| l.criteria.dominates(&g_v)) {
                        continue;
                    }
                    self.erase_dominated_labels(v, &g_v);
                    if self.dominated_at(t, &f_v) {
                        continue;
                    }
                    let handle = Handle::new();
                    self.labels[vs].push(McLabel {
                        criteria: g_v,
                        pred: Some(graph.descriptor(u)),
                        handle: Some(handle.clone()),
                    });
                    self.generated += 1;
                    self.pq.insert(f_v, v, Some(&handle));
                }
            }
        }
    }

    /// Pareto frontier found at a node by the last query.
    #[must_use]
    pub fn labels(&self, u: G::NodeCursor) -> &[McLabel] {
        let slot = self.slot(u);
        if self.stamp.get(slot) == Some(&self.timestamp) {
            &self.labels[slot]
        } else {
            &[]
        }
    }

    #[must_use]
    pub fn generated_labels(&self) -> usize {
        self.generated
    }

    /// Labels dominated by some frontier entry of the node.
    fn dominated_at(&self, u: G::NodeCursor, criteria: &CriteriaList) -> bool {
        let slot = self.slot(u);
        self.stamp[slot] == self.timestamp
            && self.labels[slot]
                .iter()
                .any(|l| l.criteria.dominates(criteria))
    }

    /// Detach the queue handle of the label at `u` whose cost is `g`.
    fn move_to_closed(&mut self, g: &CriteriaList, u: G::NodeCursor) {
        let slot = self.slot(u);
        if self.stamp[slot] != self.timestamp {
            return;
        }
        for label in &mut self.labels[slot] {
            if label.handle.is_some() && label.criteria == *g {
                label.handle = None;
            }
        }
    }

    /// Drop every label at `v` dominated by `bound`. Open labels leave the
    /// queue; closed labels propagate the pruning into their descendants,
    /// whose own labels may have become unreachable through a dominated
    /// predecessor.
    fn erase_dominated_labels(&mut self, v: G::NodeCursor, bound: &CriteriaList) {
        let graph = self.graph;
        let slot = self.slot(v);
        if self.stamp[slot] != self.timestamp {
            return;
        }
        let mut i = 0;
        while i < self.labels[slot].len() {
            if !self.labels[slot][i].criteria.is_dominated_by(bound) {
                i += 1;
                continue;
            }
            let label = self.labels[slot].remove(i);
            if label.is_queued() {
                let handle = label.handle.as_ref().expect("queued label has a handle");
                self.pq.remove(handle);
            } else {
                for e in graph.out_edges(v) {
                    let w = graph.target(e);
                    self.erase_dominated_labels(w, &bound.plus(graph.edge(e).criteria()));
                }
            }
        }
    }

    /// Global pruning when the target closes a label: no other node may keep
    /// labels dominated by the target's cost.
    fn erase_all_dominated(&mut self, t: G::NodeCursor, g_t: &CriteriaList) {
        let graph = self.graph;
        for u in graph.nodes() {
            if u == t {
                continue;
            }
            let slot = self.slot(u);
            if self.stamp[slot] != self.timestamp || self.labels[slot].is_empty() {
                continue;
            }
            self.erase_dominated_labels(u, g_t);
        }
    }
}
