//! Basic graph traversals with visitor hooks.
//!
//! Each core takes a closure invoked once per marked node, in traversal
//! order. Marks are a throwaway per-call vector; the traversals exist for
//! structural checks and bulk sweeps, not for repeated queries (the
//! distance-recording engines keep reusable state instead).

use pmgraph_graph::{DirectedGraph, NodeDescriptor};

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Reverse,
    Undirected,
}

fn marks<G: DirectedGraph>(graph: &G) -> Vec<bool> {
    vec![false; graph.descriptor_bound()]
}

fn slot<G: DirectedGraph>(graph: &G, u: G::NodeCursor) -> usize {
    graph.descriptor(u).index()
}

fn push_neighbors<G: DirectedGraph>(
    graph: &G,
    u: G::NodeCursor,
    direction: Direction,
    out: &mut Vec<G::NodeCursor>,
) {
    match direction {
        Direction::Forward => out.extend(graph.out_edges(u).map(|e| graph.target(e))),
        Direction::Reverse => out.extend(graph.in_edges(u).map(|k| graph.source(k))),
        Direction::Undirected => {
            out.extend(graph.out_edges(u).map(|e| graph.target(e)));
            out.extend(graph.in_edges(u).map(|k| graph.source(k)));
        }
    }
}

fn bfs_core<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    direction: Direction,
    mut on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    let mut marked = marks(graph);
    let mut queue = std::collections::VecDeque::new();
    let mut scratch = Vec::new();
    let mut reached = 1;

    marked[slot(graph, root)] = true;
    on_mark(root);
    queue.push_back(root);
    while let Some(u) = queue.pop_front() {
        scratch.clear();
        push_neighbors(graph, u, direction, &mut scratch);
        for &v in &scratch {
            let vs = slot(graph, v);
            if !marked[vs] {
                marked[vs] = true;
                on_mark(v);
                reached += 1;
                queue.push_back(v);
            }
        }
    }
    reached
}

fn dfs_core<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    direction: Direction,
    mut on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    let mut marked = marks(graph);
    let mut stack = vec![root];
    let mut scratch = Vec::new();
    let mut reached = 0;

    while let Some(u) = stack.pop() {
        let us = slot(graph, u);
        if marked[us] {
            continue;
        }
        marked[us] = true;
        on_mark(u);
        reached += 1;
        scratch.clear();
        push_neighbors(graph, u, direction, &mut scratch);
        while let Some(v) = scratch.pop() {
            if !marked[slot(graph, v)] {
                stack.push(v);
            }
        }
    }
    reached
}

/// Breadth-first over out-edges; returns the number of reached nodes.
pub fn bfs<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    bfs_core(graph, root, Direction::Forward, on_mark)
}

/// Breadth-first over in-edges.
pub fn reverse_bfs<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    bfs_core(graph, root, Direction::Reverse, on_mark)
}

/// Breadth-first ignoring edge direction.
pub fn undirected_bfs<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    bfs_core(graph, root, Direction::Undirected, on_mark)
}

/// Depth-first over out-edges.
pub fn dfs<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    dfs_core(graph, root, Direction::Forward, on_mark)
}

/// Depth-first over in-edges.
pub fn reverse_dfs<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    dfs_core(graph, root, Direction::Reverse, on_mark)
}

/// Depth-first ignoring edge direction.
pub fn undirected_dfs<G: DirectedGraph>(
    graph: &G,
    root: G::NodeCursor,
    on_mark: impl FnMut(G::NodeCursor),
) -> usize {
    dfs_core(graph, root, Direction::Undirected, on_mark)
}

/// Every node is reachable from the first node over out-edges.
pub fn is_connected<G: DirectedGraph>(graph: &G) -> bool {
    let Some(root) = graph.nodes().next() else {
        return true;
    };
    bfs(graph, root, |_| {}) == graph.num_nodes()
}

/// Every node is reachable from the first node when edge direction is
/// ignored.
pub fn is_weakly_connected<G: DirectedGraph>(graph: &G) -> bool {
    let Some(root) = graph.nodes().next() else {
        return true;
    };
    undirected_bfs(graph, root, |_| {}) == graph.num_nodes()
}

/// Descriptors of all out- and in-neighbors, without duplicates.
pub fn neighbors<G: DirectedGraph>(graph: &G, u: G::NodeCursor) -> Vec<NodeDescriptor> {
    let mut out: Vec<NodeDescriptor> = graph
        .out_edges(u)
        .map(|e| graph.descriptor(graph.target(e)))
        .chain(graph.in_edges(u).map(|k| graph.descriptor(graph.source(k))))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmgraph_graph::{DefaultItem, PackedMemoryGraph};

    type G = PackedMemoryGraph<DefaultItem, DefaultItem>;

    fn line(n: usize) -> (G, Vec<pmgraph_graph::NodeDescriptor>) {
        let mut g = G::new();
        let d: Vec<_> = (0..n).map(|_| g.insert_node()).collect();
        for w in d.windows(2) {
            g.insert_edge(w[0], w[1]);
        }
        (g, d)
    }

    #[test]
    fn traversals_cover_the_right_nodes() {
        let (g, d) = line(6);
        let head = g.resolve(d[0]).unwrap();
        let tail = g.resolve(d[5]).unwrap();
        let middle = g.resolve(d[3]).unwrap();

        assert_eq!(bfs(&g, head, |_| {}), 6);
        assert_eq!(bfs(&g, middle, |_| {}), 3);
        assert_eq!(dfs(&g, head, |_| {}), 6);

        assert_eq!(reverse_bfs(&g, tail, |_| {}), 6);
        assert_eq!(reverse_dfs(&g, middle, |_| {}), 4);

        assert_eq!(undirected_bfs(&g, middle, |_| {}), 6);
        assert_eq!(undirected_dfs(&g, middle, |_| {}), 6);
    }

    #[test]
    fn visitor_sees_every_marked_node_once() {
        let (g, d) = line(5);
        let head = g.resolve(d[0]).unwrap();
        let mut seen = Vec::new();
        bfs(&g, head, |u| seen.push(g.descriptor(u)));
        seen.sort_unstable();
        let mut expected = d.clone();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn connectivity_checks() {
        let (g, _) = line(4);
        // A directed line is weakly connected; whether it is forward
        // connected depends on which node iterates first.
        assert!(is_weakly_connected(&g));

        let mut g2 = G::new();
        let a = g2.insert_node();
        let _isolated = g2.insert_node();
        let b = g2.insert_node();
        g2.insert_edge(a, b);
        assert!(!is_connected(&g2));
        assert!(!is_weakly_connected(&g2));

        let empty = G::new();
        assert!(is_connected(&empty));
    }

    #[test]
    fn neighbor_sets() {
        let mut g = G::new();
        let a = g.insert_node();
        let b = g.insert_node();
        let c = g.insert_node();
        g.insert_edge(a, b);
        g.insert_edge(c, a);
        g.insert_edge(a, c);

        let u = g.resolve(a).unwrap();
        let mut expected = vec![b, c];
        expected.sort_unstable();
        assert_eq!(neighbors(&g, u), expected);
    }
}
