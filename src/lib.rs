//! **pmgraph** is a cache-friendly dynamic graph library.
//!
//! The central type is [`graph::PackedMemoryGraph`]: a directed graph kept
//! in three packed memory arrays (nodes, out-edges, in-edges) whose
//! forward-star linkage is repaired through the arrays' move observers, so
//! iteration stays sequential in memory while the graph mutates. An
//! adjacency-list twin with the same surface serves as the behavioral
//! reference, and the engines in [`algorithms`] (BFS, the Dijkstra family,
//! NAMOA* with Arc-Flags) run on either.
//!
//! The member crates are re-exported here under their domain names:
//!
//! * [`utils`]: power-of-two bit arithmetic
//! * [`tree`]: complete binary trees, layouts, the handle-based heap
//! * [`pma`]: the packed memory array itself
//! * [`graph`]: graph storage, descriptors, payload attribute traits
//! * [`algorithms`]: search engines
//! * [`io`]: DIMACS9/DIMACS10/GML/TGF/JSON readers and writers

pub use pmgraph_algorithms as algorithms;
pub use pmgraph_graph as graph;
pub use pmgraph_io as io;
pub use pmgraph_pma as pma;
pub use pmgraph_tree as tree;
pub use pmgraph_utils as utils;

pub mod prelude {
    //! The names almost every user touches.
    pub use pmgraph_algorithms::{
        AStar, ArcFlags, BackwardDijkstra, Bfs, BidirectionalDijkstra, BlindHeuristic,
        CriteriaEdge, CriteriaList, Dijkstra, MultiCriteriaDijkstra, MultiWeighted, NamoaStar,
    };
    pub use pmgraph_graph::{
        AdjacencyGraph, Attributed, BiWeighted, DefaultItem, DirectedGraph, EdgeDescriptor,
        GraphGenerator, Located, NodeDescriptor, NodeSelection, PackedMemoryGraph,
        RandomGenerator, RandomWeightedGenerator, RoadEdge, RoadNode, Weighted,
    };
    pub use pmgraph_io::{
        Dimacs10Reader, Dimacs10Writer, Dimacs9DoubleReader, Dimacs9Reader, DotWriter, GmlReader,
        GmlWriter, JsonWriter, TgfReader,
    };
    pub use pmgraph_pma::{Pma, PmaMap};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn facade_builds_a_graph_end_to_end() {
        let mut g = PackedMemoryGraph::<RoadNode, RoadEdge>::new();
        let a = g.insert_node();
        let b = g.insert_node();
        let ed = g.insert_edge(a, b).unwrap();
        let e = g.edge_cursor(ed).unwrap();
        g.edge_mut(e).set_weight(3);

        let mut dijkstra = Dijkstra::new(&g);
        let s = g.resolve(a).unwrap();
        let t = g.resolve(b).unwrap();
        assert_eq!(dijkstra.run_query(s, t), Some(3));
    }
}
