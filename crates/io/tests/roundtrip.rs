use std::fs;

use hashbrown::HashMap;
use tempfile::tempdir;

use pmgraph_algorithms::CriteriaEdge;
use pmgraph_graph::{
    BiWeighted, DirectedGraph, Located, NodeDescriptor, PackedMemoryGraph, RoadEdge, RoadNode,
    Weighted,
};
use pmgraph_io::{
    Dimacs10Reader, Dimacs10Writer, Dimacs9DoubleReader, Dimacs9Reader, GmlReader, GmlWriter,
    JsonWriter, TgfReader,
};

type Road = PackedMemoryGraph<RoadNode, RoadEdge>;

/// Edges as (file id of source, file id of target, weight), with file ids
/// taken from the reader's id table (or ranks, for a graph about to be
/// written).
fn edges_by_ids<G>(g: &G, ids: &[NodeDescriptor]) -> Vec<(usize, usize, u32)>
where
    G: DirectedGraph<EdgeData = RoadEdge>,
{
    let index: HashMap<NodeDescriptor, usize> =
        ids.iter().enumerate().map(|(i, &d)| (d, i)).collect();
    let mut out = Vec::new();
    for u in g.nodes() {
        for e in g.out_edges(u) {
            out.push((
                index[&g.descriptor(u)],
                index[&g.descriptor(g.target(e))],
                g.edge(e).weight(),
            ));
        }
    }
    out.sort_unstable();
    out
}

fn rank_ids<G: DirectedGraph>(g: &G) -> Vec<NodeDescriptor> {
    g.nodes().map(|u| g.descriptor(u)).collect()
}

fn build_road_graph(n: usize, symmetric: bool) -> Road {
    let mut g = Road::new();
    let d: Vec<_> = (0..n).map(|_| g.insert_node()).collect();
    let by_rank = rank_ids(&g);
    for (i, &dd) in by_rank.iter().enumerate() {
        let u = g.resolve(dd).unwrap();
        g.node_mut(u).set_xy((i * 13) as u32, (i * 7) as u32);
    }
    for i in 0..n {
        for step in [1usize, 4] {
            let j = (i + step) % n;
            let w = ((i * 10 + step) % 90 + 1) as u32;
            let ed = g.insert_edge(d[i], d[j]).expect("endpoints exist");
            let e = g.edge_cursor(ed).unwrap();
            g.edge_mut(e).set_weight(w);
            let k = g.in_edge_of(e);
            g.in_edge_mut(k).set_weight(w);
            if symmetric {
                let ed = g.insert_edge(d[j], d[i]).expect("endpoints exist");
                let e = g.edge_cursor(ed).unwrap();
                g.edge_mut(e).set_weight(w);
                let k = g.in_edge_of(e);
                g.in_edge_mut(k).set_weight(w);
            }
        }
    }
    g
}

#[test]
fn gml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.gml");

    let original = build_road_graph(20, false);
    GmlWriter::new(&path).write(&original).unwrap();

    let mut restored = Road::new();
    let ids = GmlReader::new(&path).read(&mut restored).unwrap();

    assert_eq!(restored.num_nodes(), original.num_nodes());
    assert_eq!(restored.num_edges(), original.num_edges());
    // The writer numbers nodes by rank, so the original's rank order is its
    // id table.
    assert_eq!(
        edges_by_ids(&original, &rank_ids(&original)),
        edges_by_ids(&restored, &ids)
    );
    // Coordinates travel through the attribute mechanism.
    for (i, &d) in ids.iter().enumerate() {
        let u = restored.resolve(d).unwrap();
        assert_eq!(restored.node(u).x, (i * 13) as u32);
        assert_eq!(restored.node(u).y, (i * 7) as u32);
    }
}

#[test]
fn dimacs10_round_trip() {
    let dir = tempdir().unwrap();
    let graph_path = dir.path().join("map.osm.graph");
    let coords_path = dir.path().join("map.osm.xyz");

    let original = build_road_graph(16, true);
    Dimacs10Writer::new(&graph_path, &coords_path)
        .write(&original)
        .unwrap();

    let mut restored = Road::new();
    let ids = Dimacs10Reader::new(&graph_path, &coords_path)
        .read(&mut restored)
        .unwrap();

    assert_eq!(restored.num_nodes(), original.num_nodes());
    assert_eq!(restored.num_edges(), original.num_edges());

    // DIMACS10 carries no weights; compare the topology only.
    let strip = |edges: Vec<(usize, usize, u32)>| -> Vec<(usize, usize)> {
        edges.into_iter().map(|(s, t, _)| (s, t)).collect()
    };
    assert_eq!(
        strip(edges_by_ids(&original, &rank_ids(&original))),
        strip(edges_by_ids(&restored, &ids))
    );
    for (i, &d) in ids.iter().enumerate() {
        let u = restored.resolve(d).unwrap();
        assert_eq!(restored.node(u).x, (i * 13) as u32);
    }
}

#[test]
fn dimacs9_reader_parses_arcs_comments_and_coordinates() {
    let dir = tempdir().unwrap();
    let graph_path = dir.path().join("graph.gr");
    let coords_path = dir.path().join("graph.co");
    fs::write(
        &graph_path,
        "c tiny test map\n\
         p sp 4 5\n\
         a 1 2 10\n\
         a 2 3 20\n\
         a 3 4 30\n\
         a 1 3 15\n\
         a 4 1 5\n",
    )
    .unwrap();
    fs::write(
        &coords_path,
        "v 1 100 -200\nv 2 300 400\nv 3 500 600\nv 4 700 800\n",
    )
    .unwrap();

    let mut g = Road::new();
    let ids = Dimacs9Reader::new(&graph_path)
        .with_coordinates(&coords_path)
        .read(&mut g)
        .unwrap();

    assert_eq!(g.num_nodes(), 4);
    assert_eq!(g.num_edges(), 5);
    assert_eq!(
        edges_by_ids(&g, &ids),
        vec![(0, 1, 10), (0, 2, 15), (1, 2, 20), (2, 3, 30), (3, 0, 5)]
    );
    let u = g.resolve(ids[0]).unwrap();
    assert_eq!((g.node(u).x, g.node(u).y), (100, 200));
}

#[test]
fn dimacs9_double_reader_pairs_both_weights() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("time.gr");
    let second = dir.path().join("dist.gr");
    fs::write(
        &first,
        "p sp 3 3\na 1 2 10\na 2 3 20\na 1 3 50\n",
    )
    .unwrap();
    fs::write(
        &second,
        "p sp 3 3\na 1 2 7\na 2 3 8\na 1 3 9\n",
    )
    .unwrap();

    let mut g = PackedMemoryGraph::<RoadNode, CriteriaEdge>::new();
    let ids = Dimacs9DoubleReader::new(&first, &second)
        .read(&mut g)
        .unwrap();

    assert_eq!(g.num_nodes(), 3);
    assert_eq!(g.num_edges(), 3);
    let mut pairs = Vec::new();
    for u in g.nodes() {
        for e in g.out_edges(u) {
            pairs.push(g.edge(e).weights());
        }
    }
    pairs.sort_unstable();
    assert_eq!(pairs, vec![(10, 7), (20, 8), (50, 9)]);
    assert_eq!(ids.len(), 3);
}

#[test]
fn dimacs9_missing_file_reports_filename() {
    let mut g = Road::new();
    let missing = "/nonexistent/pmgraph-test.gr";
    let err = Dimacs9Reader::new(missing).read(&mut g).unwrap_err();
    assert!(format!("{err:?}").contains(missing));
}

#[test]
fn tgf_reader() {
    let dir = tempdir().unwrap();
    let nodes = dir.path().join("graph.nodes");
    let edges = dir.path().join("graph.edges");
    fs::write(&nodes, "3\n0 10 20\n1 30 40\n2 50 60\n").unwrap();
    fs::write(&edges, "0 1 5\n1 2 6\n2 0 7\n").unwrap();

    let mut g = Road::new();
    let ids = TgfReader::new(&nodes, &edges).read(&mut g).unwrap();

    assert_eq!(g.num_nodes(), 3);
    assert_eq!(g.num_edges(), 3);
    assert_eq!(
        edges_by_ids(&g, &ids),
        vec![(0, 1, 5), (1, 2, 6), (2, 0, 7)]
    );
    let u = g.resolve(ids[1]).unwrap();
    assert_eq!((g.node(u).x, g.node(u).y), (30, 40));
}

#[test]
fn json_writer_emits_the_documented_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.json");

    let g = build_road_graph(5, false);
    JsonWriter::new(&path).write(&g).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    let nodes = document["graph"]["nodes"].as_array().unwrap();
    let edges = document["graph"]["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), 5);
    assert_eq!(edges.len(), g.num_edges());
    assert_eq!(nodes[0]["id"], 0);
    assert!(edges[0].get("s").is_some() && edges[0].get("t").is_some());
    assert!(edges[0].get("weight").is_some());
}

#[test]
fn dot_writer_emits_digraph() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.dot");

    let g = build_road_graph(4, false);
    pmgraph_io::DotWriter::new(&path).write(&g).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("digraph {"));
    assert!(text.trim_end().ends_with('}'));
    assert_eq!(text.matches(" -> ").count(), g.num_edges());
    assert!(text.contains("weight="));
}
