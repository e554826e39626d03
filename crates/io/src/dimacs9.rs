//! DIMACS challenge-9 readers (`p`/`a` arc lists with optional `v`
//! coordinate files).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use error_stack::{Report, Result, ResultExt};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use pmgraph_graph::{BiWeighted, DirectedGraph, Located, NodeDescriptor, Weighted};
use pmgraph_pma::Pma;

use crate::error::ReadError;

#[derive(Debug, Clone, Default)]
struct ArcRecord {
    source: u32,
    target: u32,
    weight: u32,
    second_weight: u32,
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

/// Parse every `a u v w` line; the `p` header yields `(n, m)`.
fn read_arcs(path: &Path) -> Result<(usize, usize, Vec<(u32, u32, u32)>), ReadError> {
    let mut header = None;
    let mut arcs = Vec::new();
    for line in open(path)?.lines() {
        let line = line
            .change_context(ReadError::Io)
            .attach_printable_lazy(|| format!("reading '{}'", path.display()))?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("p") => {
                let _kind: String = parse(tokens.next(), path)?;
                let n: usize = parse(tokens.next(), path)?;
                let m: usize = parse(tokens.next(), path)?;
                header = Some((n, m));
                arcs.reserve(m);
            }
            Some("a") => {
                let u: u32 = parse(tokens.next(), path)?;
                let v: u32 = parse(tokens.next(), path)?;
                let w: u32 = parse(tokens.next(), path)?;
                arcs.push((u, v, w));
            }
            _ => {}
        }
    }
    let (n, m) = header
        .ok_or_else(|| Report::new(ReadError::Format))
        .attach_printable_lazy(|| format!("missing 'p' header in '{}'", path.display()))?;
    Ok((n, m, arcs))
}

fn read_coordinates<G>(
    path: &Path,
    graph: &mut G,
    ids: &[NodeDescriptor],
) -> Result<(), ReadError>
where
    G: DirectedGraph,
    G::NodeData: Located,
{
    for line in open(path)?.lines() {
        let line = line
            .change_context(ReadError::Io)
            .attach_printable_lazy(|| format!("reading '{}'", path.display()))?;
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("v") {
            continue;
        }
        let id: usize = parse(tokens.next(), path)?;
        let x: i64 = parse(tokens.next(), path)?;
        let y: i64 = parse(tokens.next(), path)?;
        let d = *node_for(ids, id, path)?;
        let u = graph.resolve(d).expect("reader-owned descriptor");
        graph
            .node_mut(u)
            .set_xy(x.unsigned_abs() as u32, y.unsigned_abs() as u32);
    }
    Ok(())
}

fn node_for<'i>(
    ids: &'i [NodeDescriptor],
    file_id: usize,
    path: &Path,
) -> Result<&'i NodeDescriptor, ReadError> {
    ids.get(file_id.wrapping_sub(1))
        .ok_or_else(|| Report::new(ReadError::Format))
        .attach_printable_lazy(|| format!("node id {file_id} out of range in '{}'", path.display()))
}

/// Insert `n` nodes and return their descriptors in node order, which is
/// how DIMACS files address them.
fn insert_nodes<G: DirectedGraph>(graph: &mut G, n: usize, m: usize) -> Vec<NodeDescriptor> {
    graph.reserve(n, m);
    for _ in 0..n {
        graph.insert_node();
    }
    graph.nodes().map(|u| graph.descriptor(u)).collect()
}

/// Stage the records in a scratch packed memory array and drain them in
/// random order, which spreads the edge insertions over the whole graph.
fn drain_randomly<T, F>(mut staged: Pma<T>, mut apply: F)
where
    F: FnMut(T),
{
    let mut rng = SmallRng::from_entropy();
    while let Some(cell) = staged.choose_cell(&mut rng) {
        let record = staged.erase(cell, &mut ());
        apply(record);
    }
}

/// Reader for single-weight DIMACS9 arc files.
pub struct Dimacs9Reader {
    graph_path: PathBuf,
    coordinates_path: Option<PathBuf>,
}

impl Dimacs9Reader {
    pub fn new(graph_path: impl Into<PathBuf>) -> Self {
        Dimacs9Reader {
            graph_path: graph_path.into(),
            coordinates_path: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, path: impl Into<PathBuf>) -> Self {
        self.coordinates_path = Some(path.into());
        self
    }

    /// Populate `graph` and return the descriptors addressed by the file's
    /// 1-based node ids.
    pub fn read<G>(&self, graph: &mut G) -> Result<Vec<NodeDescriptor>, ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Located,
        G::EdgeData: Weighted,
    {
        info!(file = %self.graph_path.display(), "reading DIMACS9 graph");
        let (n, m, arcs) = read_arcs(&self.graph_path)?;
        graph.clear();
        let ids = insert_nodes(graph, n, m);

        let mut staged = Pma::new();
        staged.reserve(arcs.len(), &mut ());
        for (u, v, w) in arcs {
            staged.optimal_insert(
                ArcRecord {
                    source: u,
                    target: v,
                    weight: w,
                    second_weight: 0,
                },
                &mut (),
            );
        }

        let path = &self.graph_path;
        let mut failure = None;
        drain_randomly(staged, |record| {
            if failure.is_some() {
                return;
            }
            let result = (|| -> Result<(), ReadError> {
                let u = *node_for(&ids, record.source as usize, path)?;
                let v = *node_for(&ids, record.target as usize, path)?;
                if let Some(ed) = graph.insert_edge(u, v) {
                    let e = graph.edge_cursor(ed).expect("edge just inserted");
                    graph.edge_mut(e).set_weight(record.weight);
                    let k = graph.in_edge_of(e);
                    graph.in_edge_mut(k).set_weight(record.weight);
                }
                Ok(())
            })();
            if let Err(report) = result {
                failure = Some(report);
            }
        });
        if let Some(report) = failure {
            return Err(report);
        }

        if let Some(coords) = &self.coordinates_path {
            read_coordinates(coords, graph, &ids)?;
        }
        info!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            "DIMACS9 graph ready"
        );
        Ok(ids)
    }
}

/// Reader for the two-file DIMACS9 variant: a second arc file supplies the
/// second weight of every arc, in the same arc order.
pub struct Dimacs9DoubleReader {
    first_path: PathBuf,
    second_path: PathBuf,
    coordinates_path: Option<PathBuf>,
}

impl Dimacs9DoubleReader {
    pub fn new(first: impl Into<PathBuf>, second: impl Into<PathBuf>) -> Self {
        Dimacs9DoubleReader {
            first_path: first.into(),
            second_path: second.into(),
            coordinates_path: None,
        }
    }

    #[must_use]
    pub fn with_coordinates(mut self, path: impl Into<PathBuf>) -> Self {
        self.coordinates_path = Some(path.into());
        self
    }

    pub fn read<G>(&self, graph: &mut G) -> Result<Vec<NodeDescriptor>, ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Located,
        G::EdgeData: BiWeighted,
    {
        info!(
            first = %self.first_path.display(),
            second = %self.second_path.display(),
            "reading double-weight DIMACS9 graph"
        );
        let (n, m, first_arcs) = read_arcs(&self.first_path)?;
        let (_, _, second_arcs) = read_arcs(&self.second_path)?;
        if first_arcs.len() != second_arcs.len() {
            return Err(Report::new(ReadError::Format)).attach_printable_lazy(|| {
                format!(
                    "'{}' and '{}' disagree on the number of arcs",
                    self.first_path.display(),
                    self.second_path.display()
                )
            });
        }

        graph.clear();
        let ids = insert_nodes(graph, n, m);

        let mut staged = Pma::new();
        staged.reserve(first_arcs.len(), &mut ());
        for ((u, v, w1), (u2, v2, w2)) in first_arcs.into_iter().zip(second_arcs) {
            if (u, v) != (u2, v2) {
                return Err(Report::new(ReadError::Format)).attach_printable_lazy(|| {
                    format!(
                        "arc ({u}, {v}) of '{}' pairs with ({u2}, {v2}) of '{}'",
                        self.first_path.display(),
                        self.second_path.display()
                    )
                });
            }
            staged.optimal_insert(
                ArcRecord {
                    source: u,
                    target: v,
                    weight: w1,
                    second_weight: w2,
                },
                &mut (),
            );
        }

        let path = &self.first_path;
        let mut failure = None;
        drain_randomly(staged, |record| {
            if failure.is_some() {
                return;
            }
            let result = (|| -> Result<(), ReadError> {
                let u = *node_for(&ids, record.source as usize, path)?;
                let v = *node_for(&ids, record.target as usize, path)?;
                if let Some(ed) = graph.insert_edge(u, v) {
                    let e = graph.edge_cursor(ed).expect("edge just inserted");
                    graph
                        .edge_mut(e)
                        .set_weights(record.weight, record.second_weight);
                    let k = graph.in_edge_of(e);
                    graph
                        .in_edge_mut(k)
                        .set_weights(record.weight, record.second_weight);
                }
                Ok(())
            })();
            if let Err(report) = result {
                failure = Some(report);
            }
        });
        if let Some(report) = failure {
            return Err(report);
        }

        if let Some(coords) = &self.coordinates_path {
            read_coordinates(coords, graph, &ids)?;
        }
        Ok(ids)
    }
}
