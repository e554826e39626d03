//! Graph generators, mostly for tests and benchmarks.

use rand::Rng;

use crate::attr::Weighted;
use crate::descriptor::NodeDescriptor;
use crate::traits::DirectedGraph;

/// Populates an empty graph.
pub trait GraphGenerator<G: DirectedGraph> {
    /// Fill `graph`; returns the descriptors of the generated nodes.
    fn generate(&mut self, graph: &mut G) -> Vec<NodeDescriptor>;
}

/// Uniformly random simple digraph with a fixed node and edge count.
///
/// Edge endpoints are redrawn until they name a new, non-loop pair, so
/// `num_edges` must stay well below `n * (n - 1)`.
pub struct RandomGenerator {
    num_nodes: usize,
    num_edges: usize,
}

impl RandomGenerator {
    #[must_use]
    pub fn new(num_nodes: usize, num_edges: usize) -> Self {
        let simple_max = num_nodes.saturating_mul(num_nodes.saturating_sub(1));
        assert!(num_edges <= simple_max, "too many edges for a simple digraph");
        RandomGenerator {
            num_nodes,
            num_edges,
        }
    }
}

impl<G: DirectedGraph> GraphGenerator<G> for RandomGenerator {
    fn generate(&mut self, graph: &mut G) -> Vec<NodeDescriptor> {
        graph.clear();
        graph.reserve(self.num_nodes, self.num_edges);
        let descriptors: Vec<_> = (0..self.num_nodes).map(|_| graph.insert_node()).collect();

        let mut placed = 0;
        while placed < self.num_edges {
            let (Some(u), Some(v)) = (graph.choose_node(), graph.choose_node()) else {
                break;
            };
            let (ud, vd) = (graph.descriptor(u), graph.descriptor(v));
            if ud == vd || graph.has_edge(ud, vd) {
                continue;
            }
            graph.insert_edge(ud, vd);
            placed += 1;
        }
        descriptors
    }
}

/// [`RandomGenerator`] plus uniform edge weights in `1..=max_weight`.
pub struct RandomWeightedGenerator<R> {
    inner: RandomGenerator,
    max_weight: u32,
    rng: R,
}

impl<R: Rng> RandomWeightedGenerator<R> {
    #[must_use]
    pub fn new(num_nodes: usize, num_edges: usize, max_weight: u32, rng: R) -> Self {
        RandomWeightedGenerator {
            inner: RandomGenerator::new(num_nodes, num_edges),
            max_weight: max_weight.max(1),
            rng,
        }
    }
}

impl<G, R> GraphGenerator<G> for RandomWeightedGenerator<R>
where
    G: DirectedGraph,
    G::EdgeData: Weighted,
    R: Rng,
{
    fn generate(&mut self, graph: &mut G) -> Vec<NodeDescriptor> {
        let descriptors = self.inner.generate(graph);
        let nodes: Vec<G::NodeCursor> = graph.nodes().collect();
        for u in nodes {
            let edges: Vec<G::EdgeCursor> = graph.out_edges(u).collect();
            for e in edges {
                let w = self.rng.gen_range(1..=self.max_weight);
                graph.edge_mut(e).set_weight(w);
                let k = graph.in_edge_of(e);
                graph.in_edge_mut(k).set_weight(w);
            }
        }
        descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::AdjacencyGraph;
    use crate::attr::{RoadEdge, RoadNode};
    use crate::pmg::PackedMemoryGraph;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn random_generator_hits_requested_counts() {
        let mut g = PackedMemoryGraph::<RoadNode, RoadEdge>::with_rng_seed(11);
        let descriptors = RandomGenerator::new(30, 60).generate(&mut g);
        assert_eq!(descriptors.len(), 30);
        assert_eq!(g.num_nodes(), 30);
        assert_eq!(g.num_edges(), 60);
        assert!(g.has_valid_in_edges());
        // Simple digraph: no loops, no parallel edges.
        for u in g.nodes() {
            let mut seen = Vec::new();
            for e in g.out_edges(u) {
                let v = g.target(e);
                assert_ne!(u, v);
                assert!(!seen.contains(&v));
                seen.push(v);
            }
        }
    }

    #[test]
    fn weighted_generator_writes_both_payload_copies() {
        let mut g = AdjacencyGraph::<RoadNode, RoadEdge>::with_rng_seed(5);
        let rng = SmallRng::seed_from_u64(17);
        RandomWeightedGenerator::new(20, 40, 9, rng).generate(&mut g);
        assert_eq!(g.num_edges(), 40);
        for u in g.nodes() {
            for e in g.out_edges(u) {
                let w = g.edge(e).weight();
                assert!((1..=9).contains(&w));
                assert_eq!(g.in_edge(g.in_edge_of(e)).weight(), w);
            }
        }
    }
}
