//! The directed-graph surface shared by the packed-memory and
//! adjacency-list implementations.
//!
//! Cursors (`NodeCursor`, `EdgeCursor`, `InEdgeCursor`) are cheap positions
//! into the implementation's storage. They are invalidated by any mutation;
//! the only reference that survives mutation is a [`NodeDescriptor`].
//!
//! The trait splits into required storage primitives (suffixed `_linkage` /
//! `_only` where they skip validation) and provided operations that carry
//! the shared semantics: self-edges and edges at missing endpoints are
//! rejected with `None`, duplicate insertion returns the existing edge, and
//! erasing a node first erases every incident edge.

use std::fmt::Debug;

use crate::descriptor::{EdgeDescriptor, NodeDescriptor};

pub trait DirectedGraph {
    // Cursors are `Default` so they can sit in pre-sized containers (such
    // as priority-queue pools); a defaulted cursor carries no meaning.
    type NodeCursor: Copy + PartialEq + Eq + Debug + Default;
    type EdgeCursor: Copy + PartialEq + Eq + Debug + Default;
    type InEdgeCursor: Copy + PartialEq + Eq + Debug + Default;
    type NodeData: Default + Clone;
    type EdgeData: Default + Clone;

    // ---- nodes ----

    /// Insert a node wherever the storage prefers.
    fn insert_node(&mut self) -> NodeDescriptor;

    /// Insert a node immediately before an existing one in node order.
    fn insert_node_before(&mut self, before: NodeDescriptor) -> NodeDescriptor;

    /// Remove a node that has no incident edges left.
    fn erase_node_only(&mut self, d: NodeDescriptor);

    fn num_nodes(&self) -> usize;
    fn num_edges(&self) -> usize;

    fn has_node(&self, d: NodeDescriptor) -> bool;

    /// Current cursor for a descriptor; `None` when stale.
    fn resolve(&self, d: NodeDescriptor) -> Option<Self::NodeCursor>;

    fn descriptor(&self, u: Self::NodeCursor) -> NodeDescriptor;

    /// Exclusive upper bound on descriptor indices; engines size their
    /// per-node scratch with this.
    fn descriptor_bound(&self) -> usize;

    /// Dense position of the node in iteration order, in `[0, num_nodes)`.
    fn node_rank(&self, u: Self::NodeCursor) -> usize;

    // ---- edges (storage primitives; endpoints validated by the caller) ----

    /// Wire a new edge `u -> v`. Both nodes exist, `u != v`, and the edge is
    /// not present.
    fn insert_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> EdgeDescriptor;

    /// Tail-append fast path for edges arriving grouped by source, sources
    /// in non-decreasing node order.
    fn push_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> EdgeDescriptor;

    /// Unwire and remove the existing edge `u -> v`.
    fn erase_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor);

    // ---- iteration ----

    fn nodes(&self) -> impl Iterator<Item = Self::NodeCursor> + '_;
    fn out_edges(&self, u: Self::NodeCursor) -> impl Iterator<Item = Self::EdgeCursor> + '_;
    fn in_edges(&self, u: Self::NodeCursor) -> impl Iterator<Item = Self::InEdgeCursor> + '_;

    // ---- topology ----

    fn target(&self, e: Self::EdgeCursor) -> Self::NodeCursor;
    fn source(&self, k: Self::InEdgeCursor) -> Self::NodeCursor;

    /// The in-edge paired with an out-edge.
    fn in_edge_of(&self, e: Self::EdgeCursor) -> Self::InEdgeCursor;

    /// The out-edge paired with an in-edge.
    fn edge_of(&self, k: Self::InEdgeCursor) -> Self::EdgeCursor;

    fn outdeg(&self, u: Self::NodeCursor) -> usize;
    fn indeg(&self, u: Self::NodeCursor) -> usize;

    // ---- payload access ----

    fn node(&self, u: Self::NodeCursor) -> &Self::NodeData;
    fn node_mut(&mut self, u: Self::NodeCursor) -> &mut Self::NodeData;
    fn edge(&self, e: Self::EdgeCursor) -> &Self::EdgeData;
    fn edge_mut(&mut self, e: Self::EdgeCursor) -> &mut Self::EdgeData;
    fn in_edge(&self, k: Self::InEdgeCursor) -> &Self::EdgeData;
    fn in_edge_mut(&mut self, k: Self::InEdgeCursor) -> &mut Self::EdgeData;

    // ---- whole-graph ----

    fn clear(&mut self);

    /// Left-pack the storage; node and edge order are preserved.
    fn compress(&mut self);

    fn reserve(&mut self, num_nodes: usize, num_edges: usize);

    /// Uniformly random node; `None` on an empty graph.
    fn choose_node(&mut self) -> Option<Self::NodeCursor>;

    /// Exchange which nodes two descriptors refer to. Both stay valid.
    fn switch_descriptors(&mut self, a: NodeDescriptor, b: NodeDescriptor);

    // ---- provided semantics ----

    fn degree(&self, u: Self::NodeCursor) -> usize {
        self.outdeg(u) + self.indeg(u)
    }

    /// Scan `u`'s out-edges for one targeting `v`.
    fn find_edge(&self, u: Self::NodeCursor, v: Self::NodeCursor) -> Option<Self::EdgeCursor> {
        self.out_edges(u).find(|&e| self.target(e) == v)
    }

    fn has_edge(&self, u: NodeDescriptor, v: NodeDescriptor) -> bool {
        match (self.resolve(u), self.resolve(v)) {
            (Some(cu), Some(cv)) => self.find_edge(cu, cv).is_some(),
            _ => false,
        }
    }

    /// Cursor for an edge descriptor, if the edge still exists.
    fn edge_cursor(&self, ed: EdgeDescriptor) -> Option<Self::EdgeCursor> {
        let u = self.resolve(ed.source)?;
        let v = self.resolve(ed.target)?;
        self.find_edge(u, v)
    }

    /// Insert an edge. Self-edges and missing endpoints yield `None`; a
    /// duplicate yields the existing edge.
    fn insert_edge(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> Option<EdgeDescriptor> {
        if u == v || !self.has_node(u) || !self.has_node(v) {
            return None;
        }
        if self.has_edge(u, v) {
            return Some(EdgeDescriptor {
                source: u,
                target: v,
            });
        }
        Some(self.insert_edge_linkage(u, v))
    }

    /// Sequential-build fast path; same contract as [`Self::insert_edge`],
    /// plus the requirement that sources arrive in non-decreasing node
    /// order.
    fn push_edge(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> Option<EdgeDescriptor> {
        if u == v || !self.has_node(u) || !self.has_node(v) {
            return None;
        }
        if self.has_edge(u, v) {
            return Some(EdgeDescriptor {
                source: u,
                target: v,
            });
        }
        Some(self.push_edge_linkage(u, v))
    }

    /// Erase an edge; no-op when it does not exist.
    fn erase_edge(&mut self, ed: EdgeDescriptor) {
        if !self.has_edge(ed.source, ed.target) {
            return;
        }
        self.erase_edge_linkage(ed.source, ed.target);
    }

    /// Erase a node together with all incident edges; no-op on a stale
    /// descriptor.
    fn erase_node(&mut self, d: NodeDescriptor) {
        let Some(u) = self.resolve(d) else {
            return;
        };
        let mut incident: Vec<EdgeDescriptor> = Vec::with_capacity(self.degree(u));
        for e in self.out_edges(u) {
            incident.push(EdgeDescriptor {
                source: d,
                target: self.descriptor(self.target(e)),
            });
        }
        for k in self.in_edges(u) {
            incident.push(EdgeDescriptor {
                source: self.descriptor(self.source(k)),
                target: d,
            });
        }
        for ed in incident {
            self.erase_edge(ed);
        }
        self.erase_node_only(d);
    }

    /// Relocate the node behind `src` to just before the node behind `dst`:
    /// a fresh node takes over payload and edges, the descriptors are
    /// switched so `src` keeps naming the surviving data, and the vacated
    /// node is erased.
    fn move_node(&mut self, src: NodeDescriptor, dst: NodeDescriptor) {
        debug_assert!(self.has_node(src) && self.has_node(dst) && src != dst);
        let fresh = self.insert_node_before(dst);

        let src_cursor = self.resolve(src).expect("source of move exists");
        let out: Vec<(NodeDescriptor, Self::EdgeData)> = self
            .out_edges(src_cursor)
            .map(|e| (self.descriptor(self.target(e)), self.edge(e).clone()))
            .collect();
        let inc: Vec<(NodeDescriptor, Self::EdgeData)> = self
            .in_edges(src_cursor)
            .map(|k| (self.descriptor(self.source(k)), self.in_edge(k).clone()))
            .collect();

        for (t, payload) in out {
            let ed = self
                .insert_edge(fresh, t)
                .expect("fresh node accepts edges");
            let e = self.edge_cursor(ed).expect("edge just inserted");
            *self.edge_mut(e) = payload.clone();
            let k = self.in_edge_of(e);
            *self.in_edge_mut(k) = payload;
        }
        for (s, payload) in inc {
            let ed = self
                .insert_edge(s, fresh)
                .expect("fresh node accepts edges");
            let e = self.edge_cursor(ed).expect("edge just inserted");
            *self.edge_mut(e) = payload.clone();
            let k = self.in_edge_of(e);
            *self.in_edge_mut(k) = payload;
        }

        let data = self
            .node(self.resolve(src).expect("source of move exists"))
            .clone();
        *self.node_mut(self.resolve(fresh).expect("fresh node exists")) = data;

        self.switch_descriptors(src, fresh);
        // `fresh` now names the vacated original node.
        self.erase_node(fresh);
    }

    /// Every out-edge's paired in-edge maps back to it with agreeing
    /// endpoints; test support.
    fn has_valid_in_edges(&self) -> bool {
        let nodes: Vec<_> = self.nodes().collect();
        for &u in &nodes {
            for e in self.out_edges(u) {
                let k = self.in_edge_of(e);
                if self.edge_of(k) != e || self.source(k) != u {
                    return false;
                }
            }
            for k in self.in_edges(u) {
                let e = self.edge_of(k);
                if self.in_edge_of(e) != k || self.target(e) != u {
                    return false;
                }
            }
        }
        true
    }
}
