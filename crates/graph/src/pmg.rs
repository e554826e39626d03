//! Packed-memory graph storage.
//!
//! Three packed memory arrays hold the nodes, the out-edges and the
//! in-edges. Edges are grouped forward-star style: each node records the
//! position of its first out-edge and the position one past its last (which
//! is the first edge of the next node that has any, or `None` at the tail);
//! in-edges mirror this. Every edge and its paired in-edge point at each
//! other and at their far endpoints by pool position.
//!
//! Positions move whenever an array rebalances, so every mutating array call
//! gets a repair observer built from the *other* two arrays and the
//! descriptor table. The observers re-wire pairings, first/last boundaries
//! and descriptors move by move, before each destination cell is written.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use pmgraph_pma::{MoveEvent, Pma, PmaObserver};

use crate::descriptor::{DescriptorTable, EdgeDescriptor, NodeDescriptor};
use crate::traits::DirectedGraph;

/// Position of a node in the node array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeRef(pub(crate) u32);

/// Position of an out-edge in the edge array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EdgeRef(pub(crate) u32);

/// Position of an in-edge in the in-edge array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InEdgeRef(pub(crate) u32);

#[derive(Debug, Clone, Default)]
struct PmgNode<N> {
    data: N,
    desc: u32,
    first_edge: Option<u32>,
    last_edge: Option<u32>,
    first_in_edge: Option<u32>,
    last_in_edge: Option<u32>,
    out_degree: u32,
    in_degree: u32,
}

impl<N> PmgNode<N> {
    fn has_edges(&self) -> bool {
        self.first_edge.is_some()
    }

    fn has_in_edges(&self) -> bool {
        self.first_in_edge.is_some()
    }
}

#[derive(Debug, Clone, Default)]
struct PmgEdge<E> {
    data: E,
    target: u32,
    in_edge: Option<u32>,
}

#[derive(Debug, Clone, Default)]
struct PmgInEdge<E> {
    data: E,
    source: u32,
    edge: Option<u32>,
}

// ---- node-array scans shared by the graph and its observers ----

fn find_next_with_edges<N>(nodes: &Pma<PmgNode<N>>, u: usize) -> Option<usize> {
    let mut i = nodes.next_live(u);
    while i < nodes.end() {
        if nodes.get(i).expect("live node").has_edges() {
            return Some(i);
        }
        i = nodes.next_live(i);
    }
    None
}

fn find_prev_with_edges<N>(nodes: &Pma<PmgNode<N>>, u: usize) -> Option<usize> {
    let mut i = nodes.prev_live(u)?;
    loop {
        if nodes.get(i).expect("live node").has_edges() {
            return Some(i);
        }
        i = nodes.prev_live(i)?;
    }
}

fn find_next_with_in_edges<N>(nodes: &Pma<PmgNode<N>>, u: usize) -> Option<usize> {
    let mut i = nodes.next_live(u);
    while i < nodes.end() {
        if nodes.get(i).expect("live node").has_in_edges() {
            return Some(i);
        }
        i = nodes.next_live(i);
    }
    None
}

fn find_prev_with_in_edges<N>(nodes: &Pma<PmgNode<N>>, u: usize) -> Option<usize> {
    let mut i = nodes.prev_live(u)?;
    loop {
        if nodes.get(i).expect("live node").has_in_edges() {
            return Some(i);
        }
        i = nodes.prev_live(i)?;
    }
}

/// Point `u` at a new first out-edge (or at none), keeping the previous
/// edge-owning node's `last_edge` boundary in step.
fn set_first_edge<N>(nodes: &mut Pma<PmgNode<N>>, u: usize, position: Option<u32>) {
    nodes.get_mut(u).expect("live node").first_edge = position;
    if position.is_some() {
        if let Some(prev) = find_prev_with_edges(nodes, u) {
            nodes.get_mut(prev).expect("live node").last_edge = position;
        }
    } else {
        nodes.get_mut(u).expect("live node").last_edge = None;
        if let Some(prev) = find_prev_with_edges(nodes, u) {
            let next_first = find_next_with_edges(nodes, prev)
                .and_then(|n| nodes.get(n).expect("live node").first_edge);
            nodes.get_mut(prev).expect("live node").last_edge = next_first;
        }
    }
}

fn set_first_in_edge<N>(nodes: &mut Pma<PmgNode<N>>, u: usize, position: Option<u32>) {
    nodes.get_mut(u).expect("live node").first_in_edge = position;
    if position.is_some() {
        if let Some(prev) = find_prev_with_in_edges(nodes, u) {
            nodes.get_mut(prev).expect("live node").last_in_edge = position;
        }
    } else {
        nodes.get_mut(u).expect("live node").last_in_edge = None;
        if let Some(prev) = find_prev_with_in_edges(nodes, u) {
            let next_first = find_next_with_in_edges(nodes, prev)
                .and_then(|n| nodes.get(n).expect("live node").first_in_edge);
            nodes.get_mut(prev).expect("live node").last_in_edge = next_first;
        }
    }
}

// ---- repair observers, one per array ----

/// Repairs after node moves: the moved node's out-edges learn their new
/// source position, its in-edges' partners their new target position, and
/// the descriptor follows.
struct NodeRepair<'a, E> {
    edges: &'a mut Pma<PmgEdge<E>>,
    in_edges: &'a mut Pma<PmgInEdge<E>>,
    descriptors: &'a mut DescriptorTable,
}

impl<N, E> PmaObserver<PmgNode<N>> for NodeRepair<'_, E> {
    fn on_move(&mut self, ev: MoveEvent<'_, PmgNode<N>>) {
        let node = ev.value;
        if let Some(first) = node.first_edge {
            let stop = node.last_edge.map_or(self.edges.end(), |l| l as usize);
            let mut e = first as usize;
            while e < stop {
                let pair = self
                    .edges
                    .get(e)
                    .expect("live edge")
                    .in_edge
                    .expect("edge is paired") as usize;
                self.in_edges.get_mut(pair).expect("live in-edge").source = ev.dst as u32;
                e = self.edges.next_live(e);
            }
        }
        if let Some(first) = node.first_in_edge {
            let stop = node.last_in_edge.map_or(self.in_edges.end(), |l| l as usize);
            let mut k = first as usize;
            while k < stop {
                let pair = self
                    .in_edges
                    .get(k)
                    .expect("live in-edge")
                    .edge
                    .expect("in-edge is paired") as usize;
                self.edges.get_mut(pair).expect("live edge").target = ev.dst as u32;
                k = self.in_edges.next_live(k);
            }
        }
        self.descriptors.set_position(node.desc, ev.dst);
    }
}

/// Repairs after out-edge moves: the paired in-edge's back-pointer, and the
/// owning node's `first_edge` when the moved edge was it. The one-entry memo
/// skips repeat owners within a sweep; during a pool-rebuild sweep it also
/// shields against old/new index coincidences, since each node's edges move
/// contiguously.
struct EdgeRepair<'a, N, E> {
    nodes: &'a mut Pma<PmgNode<N>>,
    in_edges: &'a mut Pma<PmgInEdge<E>>,
    last_changed: Option<usize>,
}

impl<'a, N, E> EdgeRepair<'a, N, E> {
    fn new(nodes: &'a mut Pma<PmgNode<N>>, in_edges: &'a mut Pma<PmgInEdge<E>>) -> Self {
        EdgeRepair {
            nodes,
            in_edges,
            last_changed: None,
        }
    }
}

impl<N, E> PmaObserver<PmgEdge<E>> for EdgeRepair<'_, N, E> {
    fn on_move(&mut self, ev: MoveEvent<'_, PmgEdge<E>>) {
        let Some(pair) = ev.value.in_edge else {
            return;
        };
        self.in_edges.get_mut(pair as usize).expect("live in-edge").edge = Some(ev.dst as u32);

        let owner = self.in_edges.get(pair as usize).expect("live in-edge").source as usize;
        let first = self.nodes.get(owner).expect("live node").first_edge;
        if first == Some(ev.src as u32) && self.last_changed != Some(owner) {
            set_first_edge(self.nodes, owner, Some(ev.dst as u32));
            self.last_changed = Some(owner);
        }
    }

    fn on_reset(&mut self) {
        self.last_changed = None;
    }
}

/// Mirror of [`EdgeRepair`] for the in-edge array.
struct InEdgeRepair<'a, N, E> {
    nodes: &'a mut Pma<PmgNode<N>>,
    edges: &'a mut Pma<PmgEdge<E>>,
    last_changed: Option<usize>,
}

impl<'a, N, E> InEdgeRepair<'a, N, E> {
    fn new(nodes: &'a mut Pma<PmgNode<N>>, edges: &'a mut Pma<PmgEdge<E>>) -> Self {
        InEdgeRepair {
            nodes,
            edges,
            last_changed: None,
        }
    }
}

impl<N, E> PmaObserver<PmgInEdge<E>> for InEdgeRepair<'_, N, E> {
    fn on_move(&mut self, ev: MoveEvent<'_, PmgInEdge<E>>) {
        let Some(pair) = ev.value.edge else {
            return;
        };
        self.edges.get_mut(pair as usize).expect("live edge").in_edge = Some(ev.dst as u32);

        let owner = self.edges.get(pair as usize).expect("live edge").target as usize;
        let first = self.nodes.get(owner).expect("live node").first_in_edge;
        if first == Some(ev.src as u32) && self.last_changed != Some(owner) {
            set_first_in_edge(self.nodes, owner, Some(ev.dst as u32));
            self.last_changed = Some(owner);
        }
    }

    fn on_reset(&mut self) {
        self.last_changed = None;
    }
}

/// Dynamic directed graph over three packed memory arrays.
pub struct PackedMemoryGraph<N, E> {
    nodes: Pma<PmgNode<N>>,
    edges: Pma<PmgEdge<E>>,
    in_edges: Pma<PmgInEdge<E>>,
    descriptors: DescriptorTable,
    /// Source of the edge batch before the current one in the push fast
    /// path; its `last_edge` still needs patching when the batch closes.
    last_pushed: Option<usize>,
    current_pushed: Option<usize>,
    rng: SmallRng,
}

impl<N, E> Default for PackedMemoryGraph<N, E>
where
    N: Default + Clone,
    E: Default + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> PackedMemoryGraph<N, E>
where
    N: Default + Clone,
    E: Default + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        PackedMemoryGraph {
            nodes: Pma::new(),
            edges: Pma::new(),
            in_edges: Pma::new(),
            descriptors: DescriptorTable::new(),
            last_pushed: None,
            current_pushed: None,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic random choices, for tests and reproducible runs.
    #[must_use]
    pub fn with_rng_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.rng = SmallRng::seed_from_u64(seed);
        graph
    }

    fn node_at(&self, u: NodeRef) -> &PmgNode<N> {
        self.nodes.get(u.0 as usize).expect("live node cursor")
    }

    fn insert_node_at(&mut self, position: Option<usize>) -> NodeDescriptor {
        let d = self.descriptors.allocate();
        let node = PmgNode {
            desc: d.index() as u32,
            ..PmgNode::default()
        };
        let at = {
            let mut repair = NodeRepair {
                edges: &mut self.edges,
                in_edges: &mut self.in_edges,
                descriptors: &mut self.descriptors,
            };
            match position {
                Some(p) => self.nodes.insert(p, node, &mut repair),
                None => self.nodes.optimal_insert(node, &mut repair),
            }
        };
        self.descriptors.set_position(d.index() as u32, at);
        self.last_pushed = None;
        self.current_pushed = None;
        d
    }
}

impl<N, E> DirectedGraph for PackedMemoryGraph<N, E>
where
    N: Default + Clone,
    E: Default + Clone,
{
    type NodeCursor = NodeRef;
    type EdgeCursor = EdgeRef;
    type InEdgeCursor = InEdgeRef;
    type NodeData = N;
    type EdgeData = E;

    fn insert_node(&mut self) -> NodeDescriptor {
        self.insert_node_at(None)
    }

    fn insert_node_before(&mut self, before: NodeDescriptor) -> NodeDescriptor {
        let at = self
            .descriptors
            .position(before)
            .expect("insert_node_before with a stale descriptor");
        self.insert_node_at(Some(at))
    }

    fn erase_node_only(&mut self, d: NodeDescriptor) {
        let at = self
            .descriptors
            .position(d)
            .expect("erase of a stale descriptor");
        debug_assert!(!self.node_at(NodeRef(at as u32)).has_edges());
        debug_assert!(!self.node_at(NodeRef(at as u32)).has_in_edges());
        let mut repair = NodeRepair {
            edges: &mut self.edges,
            in_edges: &mut self.in_edges,
            descriptors: &mut self.descriptors,
        };
        self.nodes.erase(at, &mut repair);
        self.descriptors.release(d);
        self.last_pushed = None;
        self.current_pushed = None;
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn has_node(&self, d: NodeDescriptor) -> bool {
        self.descriptors.position(d).is_some()
    }

    fn resolve(&self, d: NodeDescriptor) -> Option<NodeRef> {
        self.descriptors.position(d).map(|p| NodeRef(p as u32))
    }

    fn descriptor(&self, u: NodeRef) -> NodeDescriptor {
        self.descriptors.current_descriptor(self.node_at(u).desc)
    }

    fn descriptor_bound(&self) -> usize {
        self.descriptors.capacity()
    }

    fn node_rank(&self, u: NodeRef) -> usize {
        self.nodes.rank_of(u.0 as usize)
    }

    fn insert_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> EdgeDescriptor {
        let u_at = self.descriptors.position(u).expect("live source");
        let v_at = self.descriptors.position(v).expect("live target");

        let e_pos = find_next_with_edges(&self.nodes, u_at)
            .and_then(|w| self.nodes.get(w).expect("live node").first_edge)
            .map_or(self.edges.end(), |f| f as usize);
        let k_pos = find_next_with_in_edges(&self.nodes, v_at)
            .and_then(|w| self.nodes.get(w).expect("live node").first_in_edge)
            .map_or(self.in_edges.end(), |f| f as usize);

        let new_edge = PmgEdge {
            data: E::default(),
            target: v_at as u32,
            in_edge: None,
        };
        let e_at = {
            let mut repair = EdgeRepair::new(&mut self.nodes, &mut self.in_edges);
            self.edges.insert(e_pos, new_edge, &mut repair)
        };

        let new_in_edge = PmgInEdge {
            data: E::default(),
            source: u_at as u32,
            edge: None,
        };
        let k_at = {
            let mut repair = InEdgeRepair::new(&mut self.nodes, &mut self.edges);
            self.in_edges.insert(k_pos, new_in_edge, &mut repair)
        };

        self.edges.get_mut(e_at).expect("new edge").in_edge = Some(k_at as u32);
        self.in_edges.get_mut(k_at).expect("new in-edge").edge = Some(e_at as u32);

        if !self.nodes.get(u_at).expect("live node").has_edges() {
            set_first_edge(&mut self.nodes, u_at, Some(e_at as u32));
            if let Some(w) = find_next_with_edges(&self.nodes, u_at) {
                let first = self.nodes.get(w).expect("live node").first_edge;
                self.nodes.get_mut(u_at).expect("live node").last_edge = first;
            }
        }
        if !self.nodes.get(v_at).expect("live node").has_in_edges() {
            set_first_in_edge(&mut self.nodes, v_at, Some(k_at as u32));
            if let Some(w) = find_next_with_in_edges(&self.nodes, v_at) {
                let first = self.nodes.get(w).expect("live node").first_in_edge;
                self.nodes.get_mut(v_at).expect("live node").last_in_edge = first;
            }
        }

        self.nodes.get_mut(u_at).expect("live node").out_degree += 1;
        self.nodes.get_mut(v_at).expect("live node").in_degree += 1;

        EdgeDescriptor {
            source: u,
            target: v,
        }
    }

    fn push_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> EdgeDescriptor {
        let u_at = self.descriptors.position(u).expect("live source");
        let v_at = self.descriptors.position(v).expect("live target");

        if self.current_pushed != Some(u_at) {
            debug_assert!(
                self.current_pushed
                    .map_or(true, |c| self.nodes.rank_of(c) <= self.nodes.rank_of(u_at)),
                "push_edge sources must arrive in node order"
            );
            self.last_pushed = self.current_pushed;
            self.current_pushed = Some(u_at);
        }

        let k_pos = find_next_with_in_edges(&self.nodes, v_at)
            .and_then(|w| self.nodes.get(w).expect("live node").first_in_edge)
            .map_or(self.in_edges.end(), |f| f as usize);

        let new_edge = PmgEdge {
            data: E::default(),
            target: v_at as u32,
            in_edge: None,
        };
        let e_at = {
            let mut repair = EdgeRepair::new(&mut self.nodes, &mut self.in_edges);
            self.edges.push_back(new_edge, &mut repair)
        };

        let new_in_edge = PmgInEdge {
            data: E::default(),
            source: u_at as u32,
            edge: None,
        };
        let k_at = {
            let mut repair = InEdgeRepair::new(&mut self.nodes, &mut self.edges);
            self.in_edges.insert(k_pos, new_in_edge, &mut repair)
        };

        self.edges.get_mut(e_at).expect("new edge").in_edge = Some(k_at as u32);
        self.in_edges.get_mut(k_at).expect("new in-edge").edge = Some(e_at as u32);

        let u_had_edges = self.nodes.get(u_at).expect("live node").has_edges();
        let v_had_in_edges = self.nodes.get(v_at).expect("live node").has_in_edges();

        if !u_had_edges {
            self.nodes.get_mut(u_at).expect("live node").first_edge = Some(e_at as u32);
            // The pushed edge sits at the tail, so the previous batch's
            // source is the node whose range closes here.
            if let Some(w) = self.last_pushed {
                self.nodes.get_mut(w).expect("live node").last_edge = Some(e_at as u32);
            }
        }
        if !v_had_in_edges {
            self.nodes.get_mut(v_at).expect("live node").first_in_edge = Some(k_at as u32);
            if let Some(w) = find_prev_with_in_edges(&self.nodes, v_at) {
                self.nodes.get_mut(w).expect("live node").last_in_edge = Some(k_at as u32);
            }
            if let Some(w) = find_next_with_in_edges(&self.nodes, v_at) {
                let first = self.nodes.get(w).expect("live node").first_in_edge;
                self.nodes.get_mut(v_at).expect("live node").last_in_edge = first;
            }
        }

        self.nodes.get_mut(u_at).expect("live node").out_degree += 1;
        self.nodes.get_mut(v_at).expect("live node").in_degree += 1;

        EdgeDescriptor {
            source: u,
            target: v,
        }
    }

    fn erase_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) {
        let u_at = self.descriptors.position(u).expect("live source");
        let v_at = self.descriptors.position(v).expect("live target");
        let u_ref = NodeRef(u_at as u32);
        let v_ref = NodeRef(v_at as u32);

        let e = self
            .find_edge(u_ref, v_ref)
            .expect("erase_edge_linkage of a missing edge");
        let e_at = e.0 as usize;
        let k_at = self.edges.get(e_at).expect("live edge").in_edge.expect("edge is paired")
            as usize;

        // Re-aim first/last boundaries before the cells disappear.
        if self.nodes.get(u_at).expect("live node").first_edge == Some(e_at as u32) {
            let next = self.edges.next_live(e_at);
            let stop = self
                .nodes
                .get(u_at)
                .expect("live node")
                .last_edge
                .map_or(self.edges.end(), |l| l as usize);
            if next == stop {
                set_first_edge(&mut self.nodes, u_at, None);
            } else {
                set_first_edge(&mut self.nodes, u_at, Some(next as u32));
            }
        }
        if self.nodes.get(v_at).expect("live node").first_in_edge == Some(k_at as u32) {
            let next = self.in_edges.next_live(k_at);
            let stop = self
                .nodes
                .get(v_at)
                .expect("live node")
                .last_in_edge
                .map_or(self.in_edges.end(), |l| l as usize);
            if next == stop {
                set_first_in_edge(&mut self.nodes, v_at, None);
            } else {
                set_first_in_edge(&mut self.nodes, v_at, Some(next as u32));
            }
        }

        self.edges.get_mut(e_at).expect("live edge").in_edge = None;
        {
            let mut repair = EdgeRepair::new(&mut self.nodes, &mut self.in_edges);
            self.edges.erase(e_at, &mut repair);
        }
        self.in_edges.get_mut(k_at).expect("live in-edge").edge = None;
        {
            let mut repair = InEdgeRepair::new(&mut self.nodes, &mut self.edges);
            self.in_edges.erase(k_at, &mut repair);
        }

        self.nodes.get_mut(u_at).expect("live node").out_degree -= 1;
        self.nodes.get_mut(v_at).expect("live node").in_degree -= 1;
        self.last_pushed = None;
        self.current_pushed = None;
    }

    fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.nodes.live_indices().map(|i| NodeRef(i as u32))
    }

    fn out_edges(&self, u: NodeRef) -> impl Iterator<Item = EdgeRef> + '_ {
        let node = self.node_at(u);
        let (pos, stop) = match node.first_edge {
            Some(first) => (
                first as usize,
                node.last_edge.map_or(self.edges.end(), |l| l as usize),
            ),
            None => (self.edges.end(), self.edges.end()),
        };
        EdgeRange {
            edges: &self.edges,
            pos,
            stop,
        }
    }

    fn in_edges(&self, u: NodeRef) -> impl Iterator<Item = InEdgeRef> + '_ {
        let node = self.node_at(u);
        let (pos, stop) = match node.first_in_edge {
            Some(first) => (
                first as usize,
                node.last_in_edge.map_or(self.in_edges.end(), |l| l as usize),
            ),
            None => (self.in_edges.end(), self.in_edges.end()),
        };
        InEdgeRange {
            in_edges: &self.in_edges,
            pos,
            stop,
        }
    }

    fn target(&self, e: EdgeRef) -> NodeRef {
        NodeRef(self.edges.get(e.0 as usize).expect("live edge").target)
    }

    fn source(&self, k: InEdgeRef) -> NodeRef {
        NodeRef(self.in_edges.get(k.0 as usize).expect("live in-edge").source)
    }

    fn in_edge_of(&self, e: EdgeRef) -> InEdgeRef {
        InEdgeRef(
            self.edges
                .get(e.0 as usize)
                .expect("live edge")
                .in_edge
                .expect("edge is paired"),
        )
    }

    fn edge_of(&self, k: InEdgeRef) -> EdgeRef {
        EdgeRef(
            self.in_edges
                .get(k.0 as usize)
                .expect("live in-edge")
                .edge
                .expect("in-edge is paired"),
        )
    }

    fn outdeg(&self, u: NodeRef) -> usize {
        self.node_at(u).out_degree as usize
    }

    fn indeg(&self, u: NodeRef) -> usize {
        self.node_at(u).in_degree as usize
    }

    fn node(&self, u: NodeRef) -> &N {
        &self.node_at(u).data
    }

    fn node_mut(&mut self, u: NodeRef) -> &mut N {
        &mut self
            .nodes
            .get_mut(u.0 as usize)
            .expect("live node cursor")
            .data
    }

    fn edge(&self, e: EdgeRef) -> &E {
        &self.edges.get(e.0 as usize).expect("live edge").data
    }

    fn edge_mut(&mut self, e: EdgeRef) -> &mut E {
        &mut self.edges.get_mut(e.0 as usize).expect("live edge").data
    }

    fn in_edge(&self, k: InEdgeRef) -> &E {
        &self.in_edges.get(k.0 as usize).expect("live in-edge").data
    }

    fn in_edge_mut(&mut self, k: InEdgeRef) -> &mut E {
        &mut self
            .in_edges
            .get_mut(k.0 as usize)
            .expect("live in-edge")
            .data
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.in_edges.clear();
        self.descriptors.clear();
        self.last_pushed = None;
        self.current_pushed = None;
    }

    fn compress(&mut self) {
        {
            let mut repair = NodeRepair {
                edges: &mut self.edges,
                in_edges: &mut self.in_edges,
                descriptors: &mut self.descriptors,
            };
            self.nodes.compress(&mut repair);
        }
        {
            let mut repair = EdgeRepair::new(&mut self.nodes, &mut self.in_edges);
            self.edges.compress(&mut repair);
        }
        {
            let mut repair = InEdgeRepair::new(&mut self.nodes, &mut self.edges);
            self.in_edges.compress(&mut repair);
        }
    }

    fn reserve(&mut self, num_nodes: usize, num_edges: usize) {
        {
            let mut repair = NodeRepair {
                edges: &mut self.edges,
                in_edges: &mut self.in_edges,
                descriptors: &mut self.descriptors,
            };
            self.nodes.reserve(num_nodes, &mut repair);
        }
        {
            let mut repair = EdgeRepair::new(&mut self.nodes, &mut self.in_edges);
            self.edges.reserve(num_edges, &mut repair);
        }
        {
            let mut repair = InEdgeRepair::new(&mut self.nodes, &mut self.edges);
            self.in_edges.reserve(num_edges, &mut repair);
        }
    }

    fn choose_node(&mut self) -> Option<NodeRef> {
        self.nodes
            .choose_cell(&mut self.rng)
            .map(|i| NodeRef(i as u32))
    }

    fn switch_descriptors(&mut self, a: NodeDescriptor, b: NodeDescriptor) {
        let a_at = self.descriptors.position(a).expect("live descriptor");
        let b_at = self.descriptors.position(b).expect("live descriptor");
        self.descriptors.swap_positions(a, b);
        self.nodes.get_mut(a_at).expect("live node").desc = b.index() as u32;
        self.nodes.get_mut(b_at).expect("live node").desc = a.index() as u32;
    }
}

/// Forward-star range over the out-edge array.
struct EdgeRange<'a, E> {
    edges: &'a Pma<PmgEdge<E>>,
    pos: usize,
    stop: usize,
}

impl<E> Iterator for EdgeRange<'_, E> {
    type Item = EdgeRef;

    fn next(&mut self) -> Option<EdgeRef> {
        if self.pos >= self.stop {
            return None;
        }
        let item = EdgeRef(self.pos as u32);
        self.pos = self.edges.next_live(self.pos);
        Some(item)
    }
}

struct InEdgeRange<'a, E> {
    in_edges: &'a Pma<PmgInEdge<E>>,
    pos: usize,
    stop: usize,
}

impl<E> Iterator for InEdgeRange<'_, E> {
    type Item = InEdgeRef;

    fn next(&mut self) -> Option<InEdgeRef> {
        if self.pos >= self.stop {
            return None;
        }
        let item = InEdgeRef(self.pos as u32);
        self.pos = self.in_edges.next_live(self.pos);
        Some(item)
    }
}
