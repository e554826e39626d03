//! Breadth-first search with per-query lazy state.

use std::collections::VecDeque;

use pmgraph_graph::DirectedGraph;

/// Hop-count BFS over out-edges.
///
/// Scratch is indexed by descriptor index and validated with a timestamp, so
/// repeated runs on the same engine skip the O(n) reinitialization.
pub struct Bfs<'a, G: DirectedGraph> {
    graph: &'a G,
    dist: Vec<u32>,
    stamp: Vec<u32>,
    timestamp: u32,
}

impl<'a, G: DirectedGraph> Bfs<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Bfs {
            graph,
            dist: Vec::new(),
            stamp: Vec::new(),
            timestamp: 0,
        }
    }

    fn ensure_scratch(&mut self) {
        let bound = self.graph.descriptor_bound();
        if self.dist.len() < bound {
            self.dist.resize(bound, 0);
            self.stamp.resize(bound, 0);
        }
    }

    fn slot(&self, u: G::NodeCursor) -> usize {
        self.graph.descriptor(u).index()
    }

    /// Traverse from `root`, recording hop distances. Returns the number of
    /// reached nodes (including the root).
    pub fn run(&mut self, root: G::NodeCursor) -> usize {
        self.ensure_scratch();
        self.timestamp += 1;
        let mut reached = 1;

        let root_slot = self.slot(root);
        self.dist[root_slot] = 0;
        self.stamp[root_slot] = self.timestamp;

        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(u) = queue.pop_front() {
            let du = self.dist[self.slot(u)];
            for e in self.graph.out_edges(u) {
                let v = self.graph.target(e);
                let vs = self.slot(v);
                if self.stamp[vs] != self.timestamp {
                    self.stamp[vs] = self.timestamp;
                    self.dist[vs] = du + 1;
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }
        reached
    }

    /// Hop distance of a node reached by the last run.
    #[must_use]
    pub fn dist(&self, u: G::NodeCursor) -> Option<u32> {
        let slot = self.slot(u);
        (self.stamp.get(slot) == Some(&self.timestamp)).then(|| self.dist[slot])
    }

    /// Largest hop distance over all reached nodes.
    #[must_use]
    pub fn max_node_distance(&self) -> u32 {
        self.graph
            .nodes()
            .filter_map(|u| self.dist(u))
            .max()
            .unwrap_or(0)
    }

    /// Largest distance recorded on a discovery edge. An edge carries its
    /// source's distance only when it leads into the next layer (the edges
    /// that discovered new nodes); back and cross edges carry nothing, so
    /// this tops out one below the deepest node.
    #[must_use]
    pub fn max_edge_distance(&self) -> u32 {
        let mut max = 0;
        for u in self.graph.nodes() {
            if let Some(du) = self.dist(u) {
                for e in self.graph.out_edges(u) {
                    if self.dist(self.graph.target(e)) == Some(du + 1) {
                        max = max.max(du);
                    }
                }
            }
        }
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmgraph_graph::{DefaultItem, PackedMemoryGraph};

    #[test]
    fn line_graph_distances() {
        let mut g = PackedMemoryGraph::<DefaultItem, DefaultItem>::new();
        let d: Vec<_> = (0..5).map(|_| g.insert_node()).collect();
        for w in d.windows(2) {
            g.insert_edge(w[0], w[1]);
        }
        let mut bfs = Bfs::new(&g);
        let start = g.resolve(d[0]).unwrap();
        assert_eq!(bfs.run(start), 5);
        assert_eq!(bfs.max_node_distance(), 4);
        assert_eq!(bfs.max_edge_distance(), 3);
        assert_eq!(bfs.dist(g.resolve(d[3]).unwrap()), Some(3));

        // Second run from the far end reuses the scratch.
        let end = g.resolve(d[4]).unwrap();
        assert_eq!(bfs.run(end), 1);
        assert_eq!(bfs.dist(start), None);
        assert_eq!(bfs.max_node_distance(), 0);
    }

    #[test]
    fn back_edge_off_the_deepest_node_carries_no_distance() {
        let mut g = PackedMemoryGraph::<DefaultItem, DefaultItem>::new();
        let d: Vec<_> = (0..5).map(|_| g.insert_node()).collect();
        for w in d.windows(2) {
            g.insert_edge(w[0], w[1]);
        }
        // The deepest node points back to the root; that edge discovers
        // nothing and must not raise the edge distance.
        g.insert_edge(d[4], d[0]);
        // A cross edge inside an already-explored layer changes nothing
        // either.
        g.insert_edge(d[3], d[1]);

        let mut bfs = Bfs::new(&g);
        let start = g.resolve(d[0]).unwrap();
        assert_eq!(bfs.run(start), 5);
        assert_eq!(bfs.max_node_distance(), 4);
        assert_eq!(bfs.max_edge_distance(), 3);
    }
}
