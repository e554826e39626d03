//! Search engines over the pmgraph surface.
//!
//! Engines are structs that borrow a graph and own their per-node scratch,
//! so repeated queries on one graph reuse allocations and initialize in
//! O(1) via timestamps. All of them run against [`pmgraph_graph::DirectedGraph`],
//! so the packed-memory and adjacency-list implementations are
//! interchangeable underneath.

pub mod bfs;
pub mod geometry;
pub mod multicriteria;
pub mod shortest_path;
pub mod traversal;

pub use bfs::Bfs;
pub use multicriteria::{
    ArcFlags, BlindHeuristic, BoundedTcHeuristic, CriteriaEdge, CriteriaList,
    GreatCircleHeuristic, Heuristic, McLabel, MultiCriteriaDijkstra, MultiWeighted, NamoaStar,
    Partition, TcHeuristic,
};
pub use shortest_path::{AStar, BackwardDijkstra, BidirectionalDijkstra, Dijkstra};
