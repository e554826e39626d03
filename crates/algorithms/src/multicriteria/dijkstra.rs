//! Plain multi-criteria label-setting (no heuristic).

use pmgraph_graph::{DirectedGraph, Located, NodeDescriptor};
use pmgraph_tree::PriorityQueue;

use super::{ArcFlags, CriteriaList, McLabel, MultiWeighted};

/// Label-setting search maintaining one Pareto frontier per node.
///
/// Labels are popped in lexicographic criteria order; every relaxation that
/// survives the dominance checks both enters the queue and the target
/// node's frontier. Runs to queue exhaustion, leaving the full Pareto
/// frontier at every reached node.
pub struct MultiCriteriaDijkstra<'a, G: DirectedGraph> {
    graph: &'a G,
    arity: usize,
    labels: Vec<Vec<McLabel>>,
    stamp: Vec<u32>,
    timestamp: u32,
    generated: usize,
    pq: PriorityQueue<CriteriaList, G::NodeCursor>,
}

impl<'a, G> MultiCriteriaDijkstra<'a, G>
where
    G: DirectedGraph,
    G::EdgeData: MultiWeighted,
{
    pub fn new(graph: &'a G, arity: usize) -> Self {
        MultiCriteriaDijkstra {
            graph,
            arity,
            labels: Vec::new(),
            stamp: Vec::new(),
            timestamp: 0,
            generated: 0,
            pq: PriorityQueue::new(),
        }
    }

    fn ensure_scratch(&mut self) {
        let bound = self.graph.descriptor_bound();
        if self.labels.len() < bound {
            self.labels.resize_with(bound, Vec::new);
            self.stamp.resize(bound, 0);
        }
    }

    fn slot(&self, u: G::NodeCursor) -> usize {
        self.graph.descriptor(u).index()
    }

    /// Build the Pareto frontiers reachable from `s`.
    pub fn run(&mut self, s: G::NodeCursor) {
        self.run_masked(s, None);
    }

    /// As [`Self::run`], exploring only edges whose arc flags admit the cell
    /// of `t`.
    pub fn run_with_flags(&mut self, s: G::NodeCursor, t: G::NodeCursor, flags: &ArcFlags)
    where
        G::NodeData: Located,
    {
        let node = self.graph.node(t);
        let mask = flags.partition().on_mask(flags.partition().cell(node.x(), node.y()));
        self.run_masked(s, Some(mask));
    }

    fn run_masked(&mut self, s: G::NodeCursor, mask: Option<u32>) {
        self.ensure_scratch();
        self.pq.clear();
        self.timestamp += 1;
        self.generated = 1;
        let graph = self.graph;

        let ss = self.slot(s);
        self.stamp[ss] = self.timestamp;
        self.labels[ss].clear();
        self.pq.insert(CriteriaList::zeros(self.arity), s, None);

        while let Some((criteria, u)) = self.pq.pop_min() {
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
                let candidate = criteria.plus(graph.edge(e).criteria());
                if self.labels[vs]
                    .iter()
                    .any(|l| l.criteria.dominates(&candidate))
                {
                    continue;
                }
                self.generated += 1;
                self.pq.insert(candidate.clone(), v, None);
                self.labels[vs].retain(|l| !l.criteria.is_dominated_by(&candidate));
                self.labels[vs].push(McLabel {
                    criteria: candidate,
                    pred: Some(graph.descriptor(u)),
                    handle: None,
                });
            }
        }
    }

    /// Pareto frontier found at a node by the last run.
    #[must_use]
    pub fn labels(&self, u: G::NodeCursor) -> &[McLabel] {
        let slot = self.slot(u);
        if self.stamp.get(slot) == Some(&self.timestamp) {
            &self.labels[slot]
        } else {
            &[]
        }
    }

    /// Predecessor descriptor of a label at `u`.
    #[must_use]
    pub fn label_predecessor(&self, u: G::NodeCursor, index: usize) -> Option<NodeDescriptor> {
        self.labels(u).get(index).and_then(|l| l.pred)
    }

    #[must_use]
    pub fn generated_labels(&self) -> usize {
        self.generated
    }
}
