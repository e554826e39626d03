//! Demonstration program: load a DIMACS10 map, run a breadth-first search
//! from a random node, and report how deep the graph is from there.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use pmgraph::algorithms::Bfs;
use pmgraph::graph::{DirectedGraph, PackedMemoryGraph, RoadEdge, RoadNode};
use pmgraph::io::Dimacs10Reader;

/// Breadth-first distances over a DIMACS10 map.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Directory containing the map files.
    base_path: PathBuf,
    /// Map name; `<base>/<name>.osm.graph` and `<base>/<name>.osm.xyz` are
    /// loaded.
    map_name: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let graph_file = args.base_path.join(format!("{}.osm.graph", args.map_name));
    let coords_file = args.base_path.join(format!("{}.osm.xyz", args.map_name));

    let mut graph = PackedMemoryGraph::<RoadNode, RoadEdge>::new();
    let reader = Dimacs10Reader::new(&graph_file, &coords_file);
    if let Err(report) = reader.read(&mut graph) {
        error!("{report:?}");
        return ExitCode::FAILURE;
    }

    let Some(start) = graph.choose_node() else {
        error!("map '{}' has no nodes", args.map_name);
        return ExitCode::FAILURE;
    };

    let mut bfs = Bfs::new(&graph);
    let reached = bfs.run(start);
    println!("Reached nodes:     {reached}");
    println!("Max edge distance: {}", bfs.max_edge_distance());
    println!("Max node distance: {}", bfs.max_node_distance());
    ExitCode::SUCCESS
}
