use pmgraph_algorithms::{
    AStar, ArcFlags, BackwardDijkstra, Bfs, BidirectionalDijkstra, BlindHeuristic,
    BoundedTcHeuristic, CriteriaEdge, CriteriaList, Dijkstra, GreatCircleHeuristic, McLabel,
    MultiCriteriaDijkstra, MultiWeighted, NamoaStar, TcHeuristic,
};
use pmgraph_graph::{
    DirectedGraph, Located, NodeDescriptor, NodeSelection, PackedMemoryGraph, RoadEdge, RoadNode,
    Weighted,
};

type Road = PackedMemoryGraph<RoadNode, RoadEdge>;
type McGraph = PackedMemoryGraph<RoadNode, CriteriaEdge>;

fn weighted_edge(g: &mut Road, u: NodeDescriptor, v: NodeDescriptor, w: u32) {
    let ed = g.insert_edge(u, v).expect("endpoints exist");
    let e = g.edge_cursor(ed).expect("edge exists");
    g.edge_mut(e).set_weight(w);
    let k = g.in_edge_of(e);
    g.in_edge_mut(k).set_weight(w);
}

fn criteria_edge(g: &mut McGraph, u: NodeDescriptor, v: NodeDescriptor, c: &[u32]) {
    let ed = g.insert_edge(u, v).expect("endpoints exist");
    let e = g.edge_cursor(ed).expect("edge exists");
    let criteria = CriteriaList::from(c.to_vec());
    *g.edge_mut(e).criteria_mut() = criteria.clone();
    let k = g.in_edge_of(e);
    *g.in_edge_mut(k).criteria_mut() = criteria;
}

/// 5-node line with unit weights.
fn line_graph() -> (Road, Vec<NodeDescriptor>) {
    let mut g = Road::new();
    let d: Vec<_> = (0..5).map(|_| g.insert_node()).collect();
    for w in d.windows(2) {
        weighted_edge(&mut g, w[0], w[1], 1);
    }
    (g, d)
}

/// Strongly connected ring with chords.
fn ring_graph(n: usize) -> (Road, Vec<NodeDescriptor>) {
    let mut g = Road::new();
    let d: Vec<_> = (0..n).map(|_| g.insert_node()).collect();
    for i in 0..n {
        weighted_edge(&mut g, d[i], d[(i + 1) % n], 3);
        weighted_edge(&mut g, d[(i + 1) % n], d[i], 3);
        if i % 3 == 0 {
            weighted_edge(&mut g, d[i], d[(i + 5) % n], 11);
        }
    }
    (g, d)
}

#[test]
fn dijkstra_early_exit_on_line() {
    let (g, d) = line_graph();
    let mut dijkstra = Dijkstra::new(&g);
    let s = g.resolve(d[0]).unwrap();
    let t = g.resolve(d[4]).unwrap();

    assert_eq!(dijkstra.run_query(s, t), Some(4));
    assert_eq!(dijkstra.settled_nodes(), 5);

    dijkstra.build_tree(s);
    assert_eq!(dijkstra.settled_nodes(), 5);
    for (i, &di) in d.iter().enumerate() {
        let u = g.resolve(di).unwrap();
        assert_eq!(dijkstra.distance(u), Some(i as u32));
    }
    // Predecessor chain walks back to the source.
    assert_eq!(dijkstra.predecessor(t), Some(d[3]));
    assert_eq!(dijkstra.predecessor(s), None);

    // The reverse direction has no edges.
    assert_eq!(dijkstra.run_query(t, s), None);
}

#[test]
fn dijkstra_sub_tree_stops_at_targets() {
    let (g, d) = line_graph();
    let mut dijkstra = Dijkstra::new(&g);
    let s = g.resolve(d[0]).unwrap();

    let mut targets = NodeSelection::new();
    targets.select(d[2]);
    dijkstra.build_sub_tree(s, &targets);
    assert_eq!(dijkstra.settled_nodes(), 3);
    assert_eq!(dijkstra.distance(g.resolve(d[2]).unwrap()), Some(2));
    assert_eq!(dijkstra.distance(g.resolve(d[4]).unwrap()), None);
}

#[test]
fn backward_matches_forward() {
    let (g, d) = ring_graph(12);
    let mut forward = Dijkstra::new(&g);
    let mut backward = BackwardDijkstra::new(&g);

    for (si, ti) in [(0usize, 7usize), (3, 1), (11, 5)] {
        let s = g.resolve(d[si]).unwrap();
        let t = g.resolve(d[ti]).unwrap();
        let expect = forward.run_query(s, t);
        assert!(expect.is_some());
        assert_eq!(backward.run_query(s, t), expect, "{si} -> {ti}");
    }

    // A full backward tree gives distances towards the root.
    let t = g.resolve(d[4]).unwrap();
    backward.build_tree(t);
    for &di in &d {
        let u = g.resolve(di).unwrap();
        let via_query = forward.run_query(u, t);
        assert_eq!(backward.distance_back(u), via_query);
    }
}

#[test]
fn bidirectional_matches_plain() {
    let (g, d) = ring_graph(16);
    let mut plain = Dijkstra::new(&g);
    let mut bidirectional = BidirectionalDijkstra::new(&g);

    for (si, ti) in [(0usize, 8usize), (2, 3), (15, 1), (5, 5), (9, 0)] {
        let s = g.resolve(d[si]).unwrap();
        let t = g.resolve(d[ti]).unwrap();
        let expect = plain.run_query(s, t);
        assert_eq!(bidirectional.run_query(s, t), expect, "{si} -> {ti}");
    }
}

#[test]
fn bidirectional_on_long_line() {
    let mut g = Road::new();
    let d: Vec<_> = (0..64).map(|_| g.insert_node()).collect();
    for w in d.windows(2) {
        weighted_edge(&mut g, w[0], w[1], 1);
        weighted_edge(&mut g, w[1], w[0], 1);
    }
    let s = g.resolve(d[0]).unwrap();
    let t = g.resolve(d[63]).unwrap();

    let mut bidirectional = BidirectionalDijkstra::new(&g);
    assert_eq!(bidirectional.run_query(s, t), Some(63));
    assert!(bidirectional.settled_nodes() > 0);
}

#[test]
fn astar_matches_dijkstra_with_exact_geometry() {
    // Nodes on an integer grid, weights equal to the Euclidean distance, so
    // the potentials are exact and the truncation loses nothing.
    let mut g = Road::new();
    let coords = [
        (0u32, 0u32),
        (100, 0),
        (200, 0),
        (100, 100),
        (200, 100),
        (300, 0),
    ];
    let d: Vec<_> = coords
        .iter()
        .map(|&(x, y)| {
            let nd = g.insert_node();
            let u = g.resolve(nd).unwrap();
            g.node_mut(u).set_xy(x, y);
            nd
        })
        .collect();
    let edges = [
        (0usize, 1usize, 100u32),
        (1, 2, 100),
        (2, 5, 100),
        (0, 3, 141),
        (3, 4, 100),
        (4, 5, 141),
        (1, 3, 100),
    ];
    for &(s, t, w) in &edges {
        weighted_edge(&mut g, d[s], d[t], w);
    }

    let mut astar = AStar::new(&g);
    let t = g.resolve(d[5]).unwrap();
    assert!(astar.has_feasible_potentials(t));

    let mut plain = Dijkstra::new(&g);
    for si in 0..5 {
        let s = g.resolve(d[si]).unwrap();
        assert_eq!(astar.run_query(s, t), plain.run_query(s, t), "from {si}");
    }
}

#[test]
fn bfs_on_line() {
    let (g, d) = line_graph();
    let mut bfs = Bfs::new(&g);
    assert_eq!(bfs.run(g.resolve(d[0]).unwrap()), 5);
    assert_eq!(bfs.max_node_distance(), 4);
}

/// Two disjoint two-hop routes with incomparable criteria.
fn two_route_graph() -> (McGraph, NodeDescriptor, NodeDescriptor) {
    let mut g = McGraph::new();
    let s = g.insert_node();
    let a = g.insert_node();
    let b = g.insert_node();
    let t = g.insert_node();
    criteria_edge(&mut g, s, a, &[1, 2]);
    criteria_edge(&mut g, s, b, &[2, 1]);
    criteria_edge(&mut g, a, t, &[1, 1]);
    criteria_edge(&mut g, b, t, &[1, 1]);
    (g, s, t)
}

fn frontier_at(labels: &[McLabel]) -> Vec<Vec<u32>> {
    let mut frontier: Vec<Vec<u32>> = labels
        .iter()
        .map(|l| l.criteria.components().to_vec())
        .collect();
    frontier.sort();
    frontier.dedup();
    frontier
}

#[test]
fn namoa_finds_both_pareto_labels() {
    let (g, s, t) = two_route_graph();
    let mut namoa = NamoaStar::new(&g, 2, BlindHeuristic);
    let sc = g.resolve(s).unwrap();
    let tc = g.resolve(t).unwrap();
    namoa.run_query(sc, tc);

    let frontier = frontier_at(namoa.labels(tc));
    assert_eq!(frontier, vec![vec![2, 3], vec![3, 2]]);
}

#[test]
fn plain_label_setting_agrees_with_namoa() {
    let (g, s, t) = two_route_graph();
    let sc = g.resolve(s).unwrap();
    let tc = g.resolve(t).unwrap();

    let mut plain = MultiCriteriaDijkstra::new(&g, 2);
    plain.run(sc);
    assert_eq!(frontier_at(plain.labels(tc)), vec![vec![2, 3], vec![3, 2]]);
    assert!(plain.generated_labels() >= 4);
}

/// Strongly connected multi-criteria ring, for the heuristic cross-checks.
fn mc_ring(n: usize) -> (McGraph, Vec<NodeDescriptor>) {
    let mut g = McGraph::new();
    let d: Vec<_> = (0..n).map(|_| g.insert_node()).collect();
    for (i, &di) in d.iter().enumerate() {
        let u = g.resolve(di).unwrap();
        g.node_mut(u).set_xy((i * 10) as u32, ((i * i) % 50) as u32);
    }
    for i in 0..n {
        let (c0, c1) = ((3 + (i % 4)) as u32, (6 - (i % 4)) as u32);
        criteria_edge(&mut g, d[i], d[(i + 1) % n], &[c0, c1]);
        criteria_edge(&mut g, d[(i + 1) % n], d[i], &[c1, c0]);
        if i % 4 == 0 {
            criteria_edge(&mut g, d[i], d[(i + 3) % n], &[2, 9]);
        }
    }
    (g, d)
}

#[test]
fn tc_heuristic_preserves_the_frontier() {
    let (g, d) = mc_ring(14);
    let s = g.resolve(d[1]).unwrap();
    let t = g.resolve(d[9]).unwrap();

    let mut blind = NamoaStar::new(&g, 2, BlindHeuristic);
    blind.run_query(s, t);
    let expected = frontier_at(blind.labels(t));
    assert!(!expected.is_empty());

    let mut tc = NamoaStar::new(&g, 2, TcHeuristic::new());
    tc.run_query(s, t);
    assert_eq!(frontier_at(tc.labels(t)), expected);
}

#[test]
fn bounded_tc_heuristic_preserves_the_frontier() {
    let (g, d) = mc_ring(14);
    let s = g.resolve(d[2]).unwrap();
    let t = g.resolve(d[11]).unwrap();

    let mut blind = NamoaStar::new(&g, 2, BlindHeuristic);
    blind.run_query(s, t);
    let expected = frontier_at(blind.labels(t));

    let mut bounded = NamoaStar::new(&g, 2, BoundedTcHeuristic::new());
    bounded.run_query(s, t);
    assert_eq!(frontier_at(bounded.labels(t)), expected);
}

#[test]
fn great_circle_heuristic_preserves_the_frontier() {
    // Weights far above the kilometre scale of the coordinates keep the
    // geographic bound loose but admissible.
    let mut g = McGraph::new();
    let d: Vec<_> = (0..6).map(|_| g.insert_node()).collect();
    for (i, &di) in d.iter().enumerate() {
        let u = g.resolve(di).unwrap();
        g.node_mut(u).set_xy((i * 20000) as u32, 0);
    }
    for i in 0..5 {
        criteria_edge(&mut g, d[i], d[i + 1], &[10_000, 12_000]);
        criteria_edge(&mut g, d[i + 1], d[i], &[12_000, 10_000]);
    }
    criteria_edge(&mut g, d[0], d[3], &[25_000, 40_000]);

    let s = g.resolve(d[0]).unwrap();
    let t = g.resolve(d[5]).unwrap();

    let mut blind = NamoaStar::new(&g, 2, BlindHeuristic);
    blind.run_query(s, t);
    let expected = frontier_at(blind.labels(t));

    let mut geo = NamoaStar::new(&g, 2, GreatCircleHeuristic::new());
    geo.run_query(s, t);
    assert_eq!(frontier_at(geo.labels(t)), expected);
}

/// Rightward ladder: two lanes, every edge moves one column right, so all
/// paths cross partition cells monotonically and never re-enter one. Both
/// lanes share each column's coordinates, keeping the cells column-pure.
fn mc_ladder(columns: usize) -> (McGraph, Vec<Vec<NodeDescriptor>>) {
    let mut g = McGraph::new();
    let mut lanes = vec![Vec::new(), Vec::new()];
    for lane in 0..2 {
        for col in 0..columns {
            let nd = g.insert_node();
            let u = g.resolve(nd).unwrap();
            g.node_mut(u).set_xy((col * 25) as u32, 0);
            lanes[lane].push(nd);
        }
    }
    for col in 0..columns - 1 {
        // Lane-keeping edges trade the criteria differently per lane, the
        // crossing edges mix them.
        criteria_edge(&mut g, lanes[0][col], lanes[0][col + 1], &[2, 5]);
        criteria_edge(&mut g, lanes[1][col], lanes[1][col + 1], &[5, 2]);
        criteria_edge(&mut g, lanes[0][col], lanes[1][col + 1], &[3, 3]);
        criteria_edge(&mut g, lanes[1][col], lanes[0][col + 1], &[4, 2]);
    }
    (g, lanes)
}

#[test]
fn arc_flags_preserve_query_results() {
    let (mut g, lanes) = mc_ladder(12);
    let flags = ArcFlags::preprocess(&mut g, 2);
    assert!(flags.generated_labels() > 0);

    for (lane_s, col_s, lane_t, col_t) in
        [(0usize, 0usize, 0usize, 11usize), (1, 0, 0, 9), (0, 2, 1, 11)]
    {
        let s = g.resolve(lanes[lane_s][col_s]).unwrap();
        let t = g.resolve(lanes[lane_t][col_t]).unwrap();

        let mut plain = NamoaStar::new(&g, 2, BlindHeuristic);
        plain.run_query(s, t);
        let expected = frontier_at(plain.labels(t));
        assert!(!expected.is_empty());

        let mut flagged = NamoaStar::new(&g, 2, BlindHeuristic);
        flagged.run_query_with_flags(s, t, &flags);
        assert_eq!(
            frontier_at(flagged.labels(t)),
            expected,
            "({lane_s},{col_s}) -> ({lane_t},{col_t})"
        );
    }
}

#[test]
fn queries_on_edgeless_graphs_return_immediately() {
    let mut g = McGraph::new();
    let s = g.insert_node();
    let t = g.insert_node();
    let sc = g.resolve(s).unwrap();
    let tc = g.resolve(t).unwrap();

    let mut namoa = NamoaStar::new(&g, 2, BlindHeuristic);
    namoa.run_query(sc, tc);
    assert!(namoa.labels(tc).is_empty());

    let mut road = Road::new();
    let a = road.insert_node();
    let b = road.insert_node();
    let ac = road.resolve(a).unwrap();
    let bc = road.resolve(b).unwrap();
    let mut plain = Dijkstra::new(&road);
    assert_eq!(plain.run_query(ac, bc), None);
}
