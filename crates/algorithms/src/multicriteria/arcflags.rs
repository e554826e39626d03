//! Arc-Flags preprocessing for the multi-criteria engines.
//!
//! The map is cut into a coordinate grid; for every cell, a backward
//! multi-criteria search from the cell's boundary marks each edge that lies
//! on some Pareto-optimal path into the cell. Queries then skip every edge
//! whose mask bit for the target's cell is clear.

use pmgraph_graph::{DirectedGraph, Located, NodeDescriptor};
use pmgraph_tree::PriorityQueue;
use tracing::{debug, info};

use super::{CriteriaList, MultiWeighted};

/// Rectangular grid partition of the coordinate range.
#[derive(Debug, Clone)]
pub struct Partition {
    xmin: u32,
    xmax: u32,
    ymin: u32,
    ymax: u32,
    div: u32,
}

impl Partition {
    /// A `div` × `div` grid over the closed coordinate ranges.
    #[must_use]
    pub fn new(xmin: u32, xmax: u32, ymin: u32, ymax: u32, div: u32) -> Self {
        Partition {
            xmin,
            xmax: xmax + 1,
            ymin,
            ymax: ymax + 1,
            div,
        }
    }

    #[must_use]
    pub fn num_cells(&self) -> u32 {
        self.div * self.div
    }

    /// Grid cell of a coordinate pair.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> u32 {
        let step_x = ((self.xmax - self.xmin) / self.div).max(1);
        let step_y = ((self.ymax - self.ymin) / self.div).max(1);
        let column = ((x.saturating_sub(self.xmin)) / step_x).min(self.div - 1);
        let row = ((y.saturating_sub(self.ymin)) / step_y).min(self.div - 1);
        row * self.div + column
    }

    /// Mask with only the cell's bit set.
    #[must_use]
    pub fn on_mask(&self, cell: u32) -> u32 {
        1 << cell
    }

    /// Mask with every bit but the cell's set.
    #[must_use]
    pub fn off_mask(&self, cell: u32) -> u32 {
        !self.on_mask(cell)
    }
}

/// A label of the per-boundary backward search.
#[derive(Debug, Clone, Default)]
struct BoundaryLabel {
    pred: Option<NodeDescriptor>,
    origin: Option<NodeDescriptor>,
}

#[derive(Debug, Clone)]
struct StoredLabel {
    criteria: CriteriaList,
    pred: NodeDescriptor,
    origin: NodeDescriptor,
}

/// Preprocessed arc-flag state: the partition the flags refer to.
#[derive(Debug, Clone)]
pub struct ArcFlags {
    partition: Partition,
    generated_labels: usize,
}

impl ArcFlags {
    /// Partition the graph by coordinates and open the flags of every edge
    /// participating in a Pareto-optimal path into each cell. Writes the
    /// masks into the edge payloads.
    pub fn preprocess<G>(graph: &mut G, arity: usize) -> ArcFlags
    where
        G: DirectedGraph,
        G::NodeData: Located,
        G::EdgeData: MultiWeighted,
    {
        let (mut xmin, mut ymin) = (u32::MAX, u32::MAX);
        let (mut xmax, mut ymax) = (0, 0);
        for u in graph.nodes() {
            let n = graph.node(u);
            xmin = xmin.min(n.x());
            xmax = xmax.max(n.x());
            ymin = ymin.min(n.y());
            ymax = ymax.max(n.y());
        }
        if xmin > xmax {
            // Empty graph.
            (xmin, xmax, ymin, ymax) = (0, 0, 0, 0);
        }
        let partition = Partition::new(xmin, xmax, ymin, ymax, 4);
        info!(
            cells = partition.num_cells(),
            "preprocessing arc flags over coordinate grid"
        );

        let mut flags = ArcFlags {
            partition,
            generated_labels: 0,
        };
        let mut labels: Vec<Vec<StoredLabel>> = vec![Vec::new(); graph.descriptor_bound()];
        let mut stamp: Vec<u32> = vec![0; graph.descriptor_bound()];
        for cell in 0..flags.partition.num_cells() {
            flags.open_flags_leading_to(graph, cell, arity, &mut labels, &mut stamp);
        }
        info!(labels = flags.generated_labels, "arc flags ready");
        flags
    }

    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Labels generated across all preprocessing searches.
    #[must_use]
    pub fn generated_labels(&self) -> usize {
        self.generated_labels
    }

    fn cell_of<G>(&self, graph: &G, u: G::NodeCursor) -> u32
    where
        G: DirectedGraph,
        G::NodeData: Located,
    {
        let n = graph.node(u);
        self.partition.cell(n.x(), n.y())
    }

    /// Boundary nodes of a cell: members with at least one out- or
    /// in-neighbor in another cell.
    fn boundary_nodes<G>(&self, graph: &G, cell: u32) -> Vec<G::NodeCursor>
    where
        G: DirectedGraph,
        G::NodeData: Located,
    {
        let mut boundary = Vec::new();
        for u in graph.nodes() {
            if self.cell_of(graph, u) != cell {
                continue;
            }
            let outward = graph
                .out_edges(u)
                .map(|e| graph.target(e))
                .chain(graph.in_edges(u).map(|k| graph.source(k)))
                .any(|v| self.cell_of(graph, v) != cell);
            if outward {
                boundary.push(u);
            }
        }
        boundary
    }

    fn open_flags_leading_to<G>(
        &mut self,
        graph: &mut G,
        cell: u32,
        arity: usize,
        labels: &mut Vec<Vec<StoredLabel>>,
        stamp: &mut Vec<u32>,
    ) where
        G: DirectedGraph,
        G::NodeData: Located,
        G::EdgeData: MultiWeighted,
    {
        labels.resize_with(graph.descriptor_bound(), Vec::new);
        stamp.resize(graph.descriptor_bound(), 0);
        let round = cell + 1;

        let boundary = self.boundary_nodes(&*graph, cell);
        debug!(cell, boundary = boundary.len(), "building boundary frontier");

        let mut queue: PriorityQueue<CriteriaList, (G::NodeCursor, BoundaryLabel)> =
            PriorityQueue::new();
        for &b in &boundary {
            self.generated_labels += 1;
            queue.insert(
                CriteriaList::zeros(arity),
                (
                    b,
                    BoundaryLabel {
                        pred: None,
                        origin: Some(graph.descriptor(b)),
                    },
                ),
                None,
            );
        }

        // Backward label-setting out of the cell; dominance applies only
        // between labels sharing a boundary origin, so every boundary node
        // keeps its own frontier.
        while let Some((criteria, (u, label))) = queue.pop_min() {
            let origin = label.origin.expect("queued labels carry an origin");
            for k in graph.in_edges(u) {
                let v = graph.source(k);
                if self.cell_of(&*graph, v) == cell {
                    continue;
                }
                let vs = graph.descriptor(v).index();
                if stamp[vs] != round {
                    stamp[vs] = round;
                    labels[vs].clear();
                }
                let candidate = criteria.plus(graph.in_edge(k).criteria());
                if labels[vs]
                    .iter()
                    .any(|l| l.origin == origin && l.criteria.dominates(&candidate))
                {
                    continue;
                }
                self.generated_labels += 1;
                queue.insert(
                    candidate.clone(),
                    (
                        v,
                        BoundaryLabel {
                            pred: Some(graph.descriptor(u)),
                            origin: Some(origin),
                        },
                    ),
                    None,
                );
                labels[vs]
                    .retain(|l| !(l.origin == origin && l.criteria.is_dominated_by(&candidate)));
                labels[vs].push(StoredLabel {
                    criteria: candidate,
                    pred: graph.descriptor(u),
                    origin,
                });
            }
        }

        // Open the flag on every edge appearing in a predecessor chain.
        let mask = self.partition.on_mask(cell);
        let all_nodes: Vec<G::NodeCursor> = graph.nodes().collect();
        for &u in &all_nodes {
            let us = graph.descriptor(u).index();
            if stamp[us] != round {
                continue;
            }
            for stored in std::mem::take(&mut labels[us]) {
                let Some(v) = graph.resolve(stored.pred) else {
                    continue;
                };
                let Some(e) = graph.find_edge(u, v) else {
                    continue;
                };
                let new_flags = graph.edge(e).flags() | mask;
                graph.edge_mut(e).set_flags(new_flags);
                let k = graph.in_edge_of(e);
                graph.in_edge_mut(k).set_flags(new_flags);
            }
        }

        // Edges whose target already lies inside the cell stay usable.
        for &u in &all_nodes {
            let out: Vec<G::EdgeCursor> = graph.out_edges(u).collect();
            for e in out {
                if self.cell_of(&*graph, graph.target(e)) == cell {
                    let new_flags = graph.edge(e).flags() | mask;
                    graph.edge_mut(e).set_flags(new_flags);
                    let k = graph.in_edge_of(e);
                    graph.in_edge_mut(k).set_flags(new_flags);
                }
            }
        }
    }
}

