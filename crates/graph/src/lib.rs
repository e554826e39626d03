//! Dynamic directed graphs with stable node descriptors.
//!
//! Two interchangeable implementations of one surface: the cache-friendly
//! [`PackedMemoryGraph`] stores nodes, out-edges and in-edges in three
//! packed memory arrays and repairs its internal positions through the
//! arrays' move observers; [`AdjacencyGraph`] is the plain slot-and-list
//! rendition used as a behavioral reference. Algorithms are written against
//! the [`DirectedGraph`] trait and run on either.

pub mod adjacency;
pub mod attr;
mod descriptor;
pub mod generate;
pub mod pmg;
mod selection;
mod traits;

pub use adjacency::AdjacencyGraph;
pub use attr::{Attributed, BiWeighted, DefaultItem, Located, RoadEdge, RoadNode, Weighted};
pub use descriptor::{DescriptorTable, EdgeDescriptor, NodeDescriptor};
pub use generate::{GraphGenerator, RandomGenerator, RandomWeightedGenerator};
pub use pmg::PackedMemoryGraph;
pub use selection::NodeSelection;
pub use traits::DirectedGraph;
