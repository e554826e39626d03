//! Model test: arbitrary operation sequences applied to the packed-memory
//! graph and the adjacency-list reference must agree at every step.

use proptest::prelude::*;

use pmgraph_graph::{
    AdjacencyGraph, DirectedGraph, EdgeDescriptor, Located, NodeDescriptor, PackedMemoryGraph,
    RoadEdge, RoadNode, Weighted,
};

type Pmg = PackedMemoryGraph<RoadNode, RoadEdge>;
type Adj = AdjacencyGraph<RoadNode, RoadEdge>;

#[derive(Debug, Clone)]
enum Op {
    InsertNode,
    EraseNode(usize),
    InsertEdge(usize, usize),
    EraseEdge(usize, usize),
    Compress,
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => Just(Op::InsertNode),
        1 => (0usize..64).prop_map(Op::EraseNode),
        6 => (0usize..64, 0usize..64).prop_map(|(a, b)| Op::InsertEdge(a, b)),
        2 => (0usize..64, 0usize..64).prop_map(|(a, b)| Op::EraseEdge(a, b)),
        1 => Just(Op::Compress),
    ];
    proptest::collection::vec(op, 1..120)
}

/// Live nodes of both graphs, paired, each tagged with a shared id.
struct Harness {
    pmg: Pmg,
    adj: Adj,
    live: Vec<(NodeDescriptor, NodeDescriptor, u32)>,
    next_tag: u32,
}

impl Harness {
    fn new() -> Self {
        Harness {
            pmg: Pmg::new(),
            adj: Adj::new(),
            live: Vec::new(),
            next_tag: 0,
        }
    }

    fn insert_node(&mut self) {
        let tag = self.next_tag;
        self.next_tag += 1;
        let pd = self.pmg.insert_node();
        let ad = self.adj.insert_node();
        let pu = self.pmg.resolve(pd).unwrap();
        self.pmg.node_mut(pu).set_xy(tag, 0);
        let au = self.adj.resolve(ad).unwrap();
        self.adj.node_mut(au).set_xy(tag, 0);
        self.live.push((pd, ad, tag));
    }

    fn erase_node(&mut self, pick: usize) {
        if self.live.is_empty() {
            return;
        }
        let (pd, ad, _) = self.live.swap_remove(pick % self.live.len());
        self.pmg.erase_node(pd);
        self.adj.erase_node(ad);
    }

    fn insert_edge(&mut self, a: usize, b: usize) {
        if self.live.is_empty() {
            return;
        }
        let (ps, as_, tag_s) = self.live[a % self.live.len()];
        let (pt, at, tag_t) = self.live[b % self.live.len()];
        let w = tag_s * 131 + tag_t + 1;
        let from_pmg = self.pmg.insert_edge(ps, pt);
        let from_adj = self.adj.insert_edge(as_, at);
        assert_eq!(from_pmg.is_some(), from_adj.is_some());
        if let Some(ed) = from_pmg {
            set_weight(&mut self.pmg, ed, w);
        }
        if let Some(ed) = from_adj {
            set_weight(&mut self.adj, ed, w);
        }
    }

    fn erase_edge(&mut self, a: usize, b: usize) {
        if self.live.is_empty() {
            return;
        }
        let (ps, as_, _) = self.live[a % self.live.len()];
        let (pt, at, _) = self.live[b % self.live.len()];
        self.pmg.erase_edge(EdgeDescriptor {
            source: ps,
            target: pt,
        });
        self.adj.erase_edge(EdgeDescriptor {
            source: as_,
            target: at,
        });
    }

    fn check(&self) {
        assert_eq!(self.pmg.num_nodes(), self.adj.num_nodes());
        assert_eq!(self.pmg.num_edges(), self.adj.num_edges());
        assert!(self.pmg.has_valid_in_edges());
        assert_eq!(tagged_edges(&self.pmg), tagged_edges(&self.adj));
        for &(pd, ad, tag) in &self.live {
            let pu = self.pmg.resolve(pd).expect("descriptor stays live");
            let au = self.adj.resolve(ad).expect("descriptor stays live");
            assert_eq!(self.pmg.node(pu).x, tag);
            assert_eq!(self.pmg.outdeg(pu), self.adj.outdeg(au));
            assert_eq!(self.pmg.indeg(pu), self.adj.indeg(au));
        }
    }
}

fn set_weight<G>(g: &mut G, ed: EdgeDescriptor, w: u32)
where
    G: DirectedGraph<EdgeData = RoadEdge>,
{
    let e = g.edge_cursor(ed).expect("edge exists");
    g.edge_mut(e).set_weight(w);
    let k = g.in_edge_of(e);
    g.in_edge_mut(k).set_weight(w);
}

fn tagged_edges<G>(g: &G) -> Vec<(u32, u32, u32)>
where
    G: DirectedGraph<NodeData = RoadNode, EdgeData = RoadEdge>,
{
    let mut out = Vec::with_capacity(g.num_edges());
    for u in g.nodes() {
        for e in g.out_edges(u) {
            out.push((g.node(u).x, g.node(g.target(e)).x, g.edge(e).weight()));
        }
    }
    out.sort_unstable();
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn packed_graph_agrees_with_reference(script in ops()) {
        let mut harness = Harness::new();
        for op in script {
            match op {
                Op::InsertNode => harness.insert_node(),
                Op::EraseNode(pick) => harness.erase_node(pick),
                Op::InsertEdge(a, b) => harness.insert_edge(a, b),
                Op::EraseEdge(a, b) => harness.erase_edge(a, b),
                Op::Compress => {
                    harness.pmg.compress();
                    harness.adj.compress();
                }
            }
            harness.check();
        }
    }
}
