//! DIMACS challenge-10 reader and writer (per-node neighbor lists with an
//! `x y z` coordinate file).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use error_stack::{Report, Result, ResultExt};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use pmgraph_graph::{DirectedGraph, Located, NodeDescriptor};
use pmgraph_pma::Pma;

use crate::error::{ReadError, WriteError};

#[derive(Debug, Clone, Default)]
struct NeighborList {
    source: usize,
    targets: Vec<usize>,
}

fn open(path: &Path) -> Result<BufReader<File>, ReadError> {
    File::open(path)
        .map(BufReader::new)
        .change_context(ReadError::Io)
        .attach_printable_lazy(|| format!("opening '{}'", path.display()))
}

/// Reader for the `<name>.osm.graph` / `<name>.osm.xyz` file pair.
pub struct Dimacs10Reader {
    graph_path: PathBuf,
    coordinates_path: PathBuf,
}

impl Dimacs10Reader {
    pub fn new(graph_path: impl Into<PathBuf>, coordinates_path: impl Into<PathBuf>) -> Self {
        Dimacs10Reader {
            graph_path: graph_path.into(),
            coordinates_path: coordinates_path.into(),
        }
    }

    pub fn read<G>(&self, graph: &mut G) -> Result<Vec<NodeDescriptor>, ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Located,
    {
        info!(file = %self.graph_path.display(), "reading DIMACS10 graph");
        let path = &self.graph_path;
        let mut lines = open(path)?.lines().filter_map(|line| match line {
            Ok(text) if text.trim_start().starts_with('%') => None,
            other => Some(other),
        });

        let header = lines
            .next()
            .ok_or_else(|| Report::new(ReadError::Format))
            .attach_printable_lazy(|| format!("missing header in '{}'", path.display()))?
            .change_context(ReadError::Io)?;
        let mut tokens = header.split_whitespace();
        let n: usize = parse(tokens.next(), path)?;
        let m: usize = parse(tokens.next(), path)?;

        graph.clear();
        graph.reserve(n, m * 2);
        for _ in 0..n {
            graph.insert_node();
        }
        let ids: Vec<NodeDescriptor> = graph.nodes().map(|u| graph.descriptor(u)).collect();

        let mut staged = Pma::new();
        staged.reserve(n, &mut ());
        for source in 0..n {
            let line = lines
                .next()
                .ok_or_else(|| Report::new(ReadError::Format))
                .attach_printable_lazy(|| {
                    format!("'{}' ends before node {}", path.display(), source + 1)
                })?
                .change_context(ReadError::Io)?;
            let mut targets = Vec::new();
            for token in line.split_whitespace() {
                let id: usize = token
                    .parse()
                    .ok()
                    .ok_or_else(|| Report::new(ReadError::Parse))
                    .attach_printable_lazy(|| format!("in '{}'", path.display()))?;
                if id == 0 || id > n {
                    return Err(Report::new(ReadError::Format)).attach_printable_lazy(|| {
                        format!("neighbor id {id} out of range in '{}'", path.display())
                    });
                }
                targets.push(id - 1);
            }
            staged.optimal_insert(NeighborList { source, targets }, &mut ());
        }

        let mut rng = SmallRng::from_entropy();
        while let Some(cell) = staged.choose_cell(&mut rng) {
            let list = staged.erase(cell, &mut ());
            for target in list.targets {
                graph.insert_edge(ids[list.source], ids[target]);
            }
        }

        self.read_coordinates(graph, &ids)?;
        info!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            "DIMACS10 graph ready"
        );
        Ok(ids)
    }

    fn read_coordinates<G>(&self, graph: &mut G, ids: &[NodeDescriptor]) -> Result<(), ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Located,
    {
        let path = &self.coordinates_path;
        for (index, line) in open(path)?.lines().enumerate() {
            if index >= ids.len() {
                break;
            }
            let line = line
                .change_context(ReadError::Io)
                .attach_printable_lazy(|| format!("reading '{}'", path.display()))?;
            let mut tokens = line.split_whitespace();
            let x: u32 = parse(tokens.next(), path)?;
            let y: u32 = parse(tokens.next(), path)?;
            let u = graph.resolve(ids[index]).expect("reader-owned descriptor");
            graph.node_mut(u).set_xy(x, y);
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(token: Option<&str>, path: &Path) -> Result<T, ReadError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| Report::new(ReadError::Parse))
        .attach_printable_lazy(|| format!("in '{}'", path.display()))
}

/// Writer for the same file pair. Nodes are numbered by rank; the edge
/// count in the header assumes the graph is symmetric, as the format does.
pub struct Dimacs10Writer {
    graph_path: PathBuf,
    coordinates_path: PathBuf,
}

impl Dimacs10Writer {
    pub fn new(graph_path: impl Into<PathBuf>, coordinates_path: impl Into<PathBuf>) -> Self {
        Dimacs10Writer {
            graph_path: graph_path.into(),
            coordinates_path: coordinates_path.into(),
        }
    }

    pub fn write<G>(&self, graph: &G) -> Result<(), WriteError>
    where
        G: DirectedGraph,
        G::NodeData: Located,
    {
        info!(file = %self.graph_path.display(), "writing DIMACS10 graph");
        let mut out = BufWriter::new(
            File::create(&self.graph_path)
                .change_context(WriteError::Io)
                .attach_printable_lazy(|| format!("creating '{}'", self.graph_path.display()))?,
        );
        let fail = |_: std::io::Error| Report::new(WriteError::Io);

        writeln!(out, "{} {}", graph.num_nodes(), graph.num_edges() / 2).map_err(fail)?;
        for u in graph.nodes() {
            let mut line = String::new();
            for e in graph.out_edges(u) {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&(graph.node_rank(graph.target(e)) + 1).to_string());
            }
            writeln!(out, "{line}").map_err(fail)?;
        }

        let mut coords = BufWriter::new(
            File::create(&self.coordinates_path)
                .change_context(WriteError::Io)
                .attach_printable_lazy(|| {
                    format!("creating '{}'", self.coordinates_path.display())
                })?,
        );
        for u in graph.nodes() {
            let n = graph.node(u);
            writeln!(coords, "{} {} 0", n.x(), n.y()).map_err(fail)?;
        }
        Ok(())
    }
}
