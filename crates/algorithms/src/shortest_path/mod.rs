//! Single-criterion shortest paths.
//!
//! Every engine owns its per-node scratch (distances, predecessors, queue
//! handles), indexed by descriptor index and guarded by a per-engine
//! timestamp: a node's scratch counts only if its stamp equals the current
//! query's, which makes query startup O(1) instead of O(n).

mod astar;
mod bidirectional;
mod dijkstra;

pub use astar::AStar;
pub use bidirectional::BidirectionalDijkstra;
pub use dijkstra::{BackwardDijkstra, Dijkstra};

/// Distance value for "not reached"; also the backward/forward sentinels
/// inside the bidirectional engine.
pub(crate) const UNREACHED: u32 = u32::MAX;
