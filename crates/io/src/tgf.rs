//! Two-file trivial graph format: a node file (`n`, then `id x y` lines)
//! and an edge file (`u v w` lines). Ids are 0-based.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use error_stack::{Report, Result, ResultExt};
use tracing::info;

use pmgraph_graph::{DirectedGraph, Located, NodeDescriptor, Weighted};

use crate::error::ReadError;

pub struct TgfReader {
    node_path: PathBuf,
    edge_path: PathBuf,
}

impl TgfReader {
    pub fn new(node_path: impl Into<PathBuf>, edge_path: impl Into<PathBuf>) -> Self {
        TgfReader {
            node_path: node_path.into(),
            edge_path: edge_path.into(),
        }
    }

    pub fn read<G>(&self, graph: &mut G) -> Result<Vec<NodeDescriptor>, ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Located,
        G::EdgeData: Weighted,
    {
        info!(
            nodes = %self.node_path.display(),
            edges = %self.edge_path.display(),
            "reading TGF graph"
        );
        graph.clear();

        let path = &self.node_path;
        let mut lines = open(path)?.lines();
        let header = lines
            .next()
            .ok_or_else(|| Report::new(ReadError::Format))
            .attach_printable_lazy(|| format!("empty node file '{}'", path.display()))?
            .change_context(ReadError::Io)?;
        let n: usize = parse(header.split_whitespace().next(), path)?;

        for _ in 0..n {
            graph.insert_node();
        }
        let ids: Vec<NodeDescriptor> = graph.nodes().map(|u| graph.descriptor(u)).collect();

        for line in lines {
            let line = line.change_context(ReadError::Io)?;
            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };
            let id: usize = parse(Some(first), path)?;
            let x: f64 = parse(tokens.next(), path)?;
            let y: f64 = parse(tokens.next(), path)?;
            let d = *ids
                .get(id)
                .ok_or_else(|| Report::new(ReadError::Format))
                .attach_printable_lazy(|| {
                    format!("node id {id} out of range in '{}'", path.display())
                })?;
            let u = graph.resolve(d).expect("reader-owned descriptor");
            graph.node_mut(u).set_xy(x as u32, y as u32);
        }

        let path = &self.edge_path;
        for line in open(path)?.lines() {
            let line = line.change_context(ReadError::Io)?;
            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };
            let s: usize = parse(Some(first), path)?;
            let t: usize = parse(tokens.next(), path)?;
            let w: f64 = parse(tokens.next(), path)?;
            let (Some(&sd), Some(&td)) = (ids.get(s), ids.get(t)) else {
                return Err(Report::new(ReadError::Format)).attach_printable_lazy(|| {
                    format!("edge endpoint out of range in '{}'", path.display())
                });
            };
            if let Some(ed) = graph.insert_edge(sd, td) {
                let e = graph.edge_cursor(ed).expect("edge just inserted");
                graph.edge_mut(e).set_weight(w as u32);
                let k = graph.in_edge_of(e);
                graph.in_edge_mut(k).set_weight(w as u32);
            }
        }
        Ok(ids)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ReadError> {
    File::open(path)
        .map(BufReader::new)
        .change_context(ReadError::Io)
        .attach_printable_lazy(|| format!("opening '{}'", path.display()))
}

fn parse<T: std::str::FromStr>(token: Option<&str>, path: &Path) -> Result<T, ReadError> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| Report::new(ReadError::Parse))
        .attach_printable_lazy(|| format!("in '{}'", path.display()))
}
