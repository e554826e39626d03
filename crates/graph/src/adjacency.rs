//! Adjacency-list reference implementation of the graph surface.
//!
//! Nodes live in slots threaded on a doubly-linked order list; each node
//! keeps plain vectors of its out- and in-edge slots. Nothing ever moves, so
//! no observers are involved. This implementation exists to cross-check the
//! packed-memory graph operation for operation.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::descriptor::{DescriptorTable, EdgeDescriptor, NodeDescriptor};
use crate::traits::DirectedGraph;

/// Node slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeRef(u32);

/// Edge slot, viewed from its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EdgeRef(u32);

/// Edge slot, viewed from its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InEdgeRef(u32);

#[derive(Debug, Clone)]
struct AdjNode<N> {
    data: N,
    desc: u32,
    prev: Option<u32>,
    next: Option<u32>,
    out: Vec<u32>,
    inc: Vec<u32>,
}

#[derive(Debug, Clone)]
struct AdjEdge<E> {
    out_data: E,
    in_data: E,
    source: u32,
    target: u32,
}

/// Doubly-linked adjacency-list graph with the same descriptor contract as
/// the packed-memory implementation.
pub struct AdjacencyGraph<N, E> {
    nodes: Vec<Option<AdjNode<N>>>,
    free_nodes: Vec<u32>,
    edges: Vec<Option<AdjEdge<E>>>,
    free_edges: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    descriptors: DescriptorTable,
    num_nodes: usize,
    num_edges: usize,
    rng: SmallRng,
}

impl<N, E> Default for AdjacencyGraph<N, E>
where
    N: Default + Clone,
    E: Default + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> AdjacencyGraph<N, E>
where
    N: Default + Clone,
    E: Default + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        AdjacencyGraph {
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            edges: Vec::new(),
            free_edges: Vec::new(),
            head: None,
            tail: None,
            descriptors: DescriptorTable::new(),
            num_nodes: 0,
            num_edges: 0,
            rng: SmallRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn with_rng_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.rng = SmallRng::seed_from_u64(seed);
        graph
    }

    fn node_at(&self, u: NodeRef) -> &AdjNode<N> {
        self.nodes[u.0 as usize].as_ref().expect("live node")
    }

    fn node_at_mut(&mut self, u: NodeRef) -> &mut AdjNode<N> {
        self.nodes[u.0 as usize].as_mut().expect("live node")
    }

    fn edge_at(&self, slot: u32) -> &AdjEdge<E> {
        self.edges[slot as usize].as_ref().expect("live edge")
    }

    fn alloc_node(&mut self, node: AdjNode<N>) -> u32 {
        if let Some(slot) = self.free_nodes.pop() {
            self.nodes[slot as usize] = Some(node);
            slot
        } else {
            self.nodes.push(Some(node));
            (self.nodes.len() - 1) as u32
        }
    }

    fn alloc_edge(&mut self, edge: AdjEdge<E>) -> u32 {
        if let Some(slot) = self.free_edges.pop() {
            self.edges[slot as usize] = Some(edge);
            slot
        } else {
            self.edges.push(Some(edge));
            (self.edges.len() - 1) as u32
        }
    }

    /// Splice a fresh node in front of `before`, or at the tail for `None`.
    fn link_node(&mut self, slot: u32, before: Option<u32>) {
        match before {
            Some(next) => {
                let prev = self.nodes[next as usize].as_ref().expect("live node").prev;
                self.nodes[slot as usize].as_mut().expect("live node").prev = prev;
                self.nodes[slot as usize].as_mut().expect("live node").next = Some(next);
                self.nodes[next as usize].as_mut().expect("live node").prev = Some(slot);
                match prev {
                    Some(p) => self.nodes[p as usize].as_mut().expect("live node").next = Some(slot),
                    None => self.head = Some(slot),
                }
            }
            None => {
                self.nodes[slot as usize].as_mut().expect("live node").prev = self.tail;
                self.nodes[slot as usize].as_mut().expect("live node").next = None;
                match self.tail {
                    Some(t) => self.nodes[t as usize].as_mut().expect("live node").next = Some(slot),
                    None => self.head = Some(slot),
                }
                self.tail = Some(slot);
            }
        }
    }

    fn insert_node_at(&mut self, before: Option<u32>) -> NodeDescriptor {
        let d = self.descriptors.allocate();
        let slot = self.alloc_node(AdjNode {
            data: N::default(),
            desc: d.index() as u32,
            prev: None,
            next: None,
            out: Vec::new(),
            inc: Vec::new(),
        });
        self.link_node(slot, before);
        self.descriptors.set_position(d.index() as u32, slot as usize);
        self.num_nodes += 1;
        d
    }
}

impl<N, E> DirectedGraph for AdjacencyGraph<N, E>
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
            .expect("insert_node_before with a stale descriptor") as u32;
        self.insert_node_at(Some(at))
    }

    fn erase_node_only(&mut self, d: NodeDescriptor) {
        let slot = self
            .descriptors
            .position(d)
            .expect("erase of a stale descriptor") as u32;
        let node = self.nodes[slot as usize].take().expect("live node");
        debug_assert!(node.out.is_empty() && node.inc.is_empty());
        match node.prev {
            Some(p) => self.nodes[p as usize].as_mut().expect("live node").next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n as usize].as_mut().expect("live node").prev = node.prev,
            None => self.tail = node.prev,
        }
        self.free_nodes.push(slot);
        self.descriptors.release(d);
        self.num_nodes -= 1;
    }

    fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn num_edges(&self) -> usize {
        self.num_edges
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
        let mut rank = 0;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            if slot == u.0 {
                return rank;
            }
            rank += 1;
            cursor = self.nodes[slot as usize].as_ref().expect("live node").next;
        }
        unreachable!("cursor not in node list")
    }

    fn insert_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> EdgeDescriptor {
        let u_slot = self.descriptors.position(u).expect("live source") as u32;
        let v_slot = self.descriptors.position(v).expect("live target") as u32;
        let slot = self.alloc_edge(AdjEdge {
            out_data: E::default(),
            in_data: E::default(),
            source: u_slot,
            target: v_slot,
        });
        self.nodes[u_slot as usize]
            .as_mut()
            .expect("live node")
            .out
            .push(slot);
        self.nodes[v_slot as usize]
            .as_mut()
            .expect("live node")
            .inc
            .push(slot);
        self.num_edges += 1;
        EdgeDescriptor {
            source: u,
            target: v,
        }
    }

    fn push_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) -> EdgeDescriptor {
        // Appending is already the fast path here.
        self.insert_edge_linkage(u, v)
    }

    fn erase_edge_linkage(&mut self, u: NodeDescriptor, v: NodeDescriptor) {
        let u_slot = self.descriptors.position(u).expect("live source") as u32;
        let v_slot = self.descriptors.position(v).expect("live target") as u32;
        let pos = self.nodes[u_slot as usize]
            .as_ref()
            .expect("live node")
            .out
            .iter()
            .position(|&s| self.edge_at(s).target == v_slot)
            .expect("erase_edge_linkage of a missing edge");
        let slot = self.nodes[u_slot as usize]
            .as_mut()
            .expect("live node")
            .out
            .remove(pos);
        let inc = &mut self.nodes[v_slot as usize].as_mut().expect("live node").inc;
        let inc_pos = inc.iter().position(|&s| s == slot).expect("paired in-edge");
        inc.remove(inc_pos);
        self.edges[slot as usize] = None;
        self.free_edges.push(slot);
        self.num_edges -= 1;
    }

    fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        NodeIter {
            graph: self,
            cursor: self.head,
        }
    }

    fn out_edges(&self, u: NodeRef) -> impl Iterator<Item = EdgeRef> + '_ {
        self.node_at(u).out.iter().map(|&s| EdgeRef(s))
    }

    fn in_edges(&self, u: NodeRef) -> impl Iterator<Item = InEdgeRef> + '_ {
        self.node_at(u).inc.iter().map(|&s| InEdgeRef(s))
    }

    fn target(&self, e: EdgeRef) -> NodeRef {
        NodeRef(self.edge_at(e.0).target)
    }

    fn source(&self, k: InEdgeRef) -> NodeRef {
        NodeRef(self.edge_at(k.0).source)
    }

    fn in_edge_of(&self, e: EdgeRef) -> InEdgeRef {
        InEdgeRef(e.0)
    }

    fn edge_of(&self, k: InEdgeRef) -> EdgeRef {
        EdgeRef(k.0)
    }

    fn outdeg(&self, u: NodeRef) -> usize {
        self.node_at(u).out.len()
    }

    fn indeg(&self, u: NodeRef) -> usize {
        self.node_at(u).inc.len()
    }

    fn node(&self, u: NodeRef) -> &N {
        &self.node_at(u).data
    }

    fn node_mut(&mut self, u: NodeRef) -> &mut N {
        &mut self.node_at_mut(u).data
    }

    fn edge(&self, e: EdgeRef) -> &E {
        &self.edge_at(e.0).out_data
    }

    fn edge_mut(&mut self, e: EdgeRef) -> &mut E {
        &mut self.edges[e.0 as usize].as_mut().expect("live edge").out_data
    }

    fn in_edge(&self, k: InEdgeRef) -> &E {
        &self.edge_at(k.0).in_data
    }

    fn in_edge_mut(&mut self, k: InEdgeRef) -> &mut E {
        &mut self.edges[k.0 as usize].as_mut().expect("live edge").in_data
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free_nodes.clear();
        self.edges.clear();
        self.free_edges.clear();
        self.head = None;
        self.tail = None;
        self.descriptors.clear();
        self.num_nodes = 0;
        self.num_edges = 0;
    }

    fn compress(&mut self) {
        // Nothing moves in slot storage.
    }

    fn reserve(&mut self, num_nodes: usize, num_edges: usize) {
        self.nodes.reserve(num_nodes.saturating_sub(self.nodes.len()));
        self.edges.reserve(num_edges.saturating_sub(self.edges.len()));
    }

    fn choose_node(&mut self) -> Option<NodeRef> {
        if self.num_nodes == 0 {
            return None;
        }
        let mut remaining = self.rng.gen_range(0..self.num_nodes);
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            if remaining == 0 {
                return Some(NodeRef(slot));
            }
            remaining -= 1;
            cursor = self.nodes[slot as usize].as_ref().expect("live node").next;
        }
        None
    }

    fn switch_descriptors(&mut self, a: NodeDescriptor, b: NodeDescriptor) {
        let a_slot = self.descriptors.position(a).expect("live descriptor");
        let b_slot = self.descriptors.position(b).expect("live descriptor");
        self.descriptors.swap_positions(a, b);
        self.nodes[a_slot].as_mut().expect("live node").desc = b.index() as u32;
        self.nodes[b_slot].as_mut().expect("live node").desc = a.index() as u32;
    }
}

struct NodeIter<'a, N, E> {
    graph: &'a AdjacencyGraph<N, E>,
    cursor: Option<u32>,
}

impl<N, E> Iterator for NodeIter<'_, N, E> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let slot = self.cursor?;
        self.cursor = self.graph.nodes[slot as usize]
            .as_ref()
            .expect("live node")
            .next;
        Some(NodeRef(slot))
    }
}
