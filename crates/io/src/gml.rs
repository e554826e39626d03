//! GML reader and writer: whitespace-token records with key/value
//! attributes passed through to the payloads.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use error_stack::{Report, Result, ResultExt};
use tracing::info;

use pmgraph_graph::{Attributed, DirectedGraph, NodeDescriptor};

use crate::error::{ReadError, WriteError};

pub struct GmlReader {
    path: PathBuf,
}

impl GmlReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GmlReader { path: path.into() }
    }

    /// Populate `graph`; node records are numbered 0.. in file order, which
    /// is what edge records refer to.
    pub fn read<G>(&self, graph: &mut G) -> Result<Vec<NodeDescriptor>, ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Attributed,
        G::EdgeData: Attributed,
    {
        info!(file = %self.path.display(), "reading GML graph");
        let mut text = String::new();
        File::open(&self.path)
            .and_then(|mut f| f.read_to_string(&mut text))
            .change_context(ReadError::Io)
            .attach_printable_lazy(|| format!("opening '{}'", self.path.display()))?;

        graph.clear();
        let mut ids = Vec::new();
        let mut tokens = text.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "node" => self.read_node(graph, &mut tokens, &mut ids)?,
                "edge" => self.read_edge(graph, &mut tokens, &ids)?,
                _ => {}
            }
        }
        Ok(ids)
    }

    fn next_token<'t>(
        &self,
        tokens: &mut impl Iterator<Item = &'t str>,
        what: &str,
    ) -> Result<&'t str, ReadError> {
        tokens
            .next()
            .ok_or_else(|| Report::new(ReadError::Format))
            .attach_printable_lazy(|| {
                format!("expected {what} in '{}'", self.path.display())
            })
    }

    fn read_node<'t, G>(
        &self,
        graph: &mut G,
        tokens: &mut impl Iterator<Item = &'t str>,
        ids: &mut Vec<NodeDescriptor>,
    ) -> Result<(), ReadError>
    where
        G: DirectedGraph,
        G::NodeData: Attributed,
    {
        if self.next_token(tokens, "'['")? != "[" {
            return Err(Report::new(ReadError::Format))
                .attach_printable_lazy(|| format!("node without '[' in '{}'", self.path.display()));
        }
        let d = graph.insert_node();
        ids.push(d);
        let u = graph.resolve(d).expect("fresh descriptor");
        loop {
            let key = self.next_token(tokens, "node attribute or ']'")?;
            if key == "]" {
                return Ok(());
            }
            let value = self.next_token(tokens, "attribute value")?;
            graph.node_mut(u).set_attr(key, value);
        }
    }

    fn read_edge<'t, G>(
        &self,
        graph: &mut G,
        tokens: &mut impl Iterator<Item = &'t str>,
        ids: &[NodeDescriptor],
    ) -> Result<(), ReadError>
    where
        G: DirectedGraph,
        G::EdgeData: Attributed,
    {
        if self.next_token(tokens, "'['")? != "[" {
            return Err(Report::new(ReadError::Format))
                .attach_printable_lazy(|| format!("edge without '[' in '{}'", self.path.display()));
        }
        let mut source: Option<usize> = None;
        let mut target: Option<usize> = None;
        let mut attrs: Vec<(String, String)> = Vec::new();
        loop {
            let key = self.next_token(tokens, "edge attribute or ']'")?;
            if key == "]" {
                break;
            }
            let value = self.next_token(tokens, "attribute value")?;
            match key {
                "source" => source = value.parse().ok(),
                "target" => target = value.parse().ok(),
                _ => attrs.push((key.to_owned(), value.to_owned())),
            }
        }
        let (Some(s), Some(t)) = (source, target) else {
            return Err(Report::new(ReadError::Format)).attach_printable_lazy(|| {
                format!("edge without endpoints in '{}'", self.path.display())
            });
        };
        let (Some(&sd), Some(&td)) = (ids.get(s), ids.get(t)) else {
            return Err(Report::new(ReadError::Format)).attach_printable_lazy(|| {
                format!("edge endpoint out of range in '{}'", self.path.display())
            });
        };
        if let Some(ed) = graph.insert_edge(sd, td) {
            let e = graph.edge_cursor(ed).expect("edge just inserted");
            for (key, value) in &attrs {
                graph.edge_mut(e).set_attr(key, value);
            }
            let k = graph.in_edge_of(e);
            for (key, value) in &attrs {
                graph.in_edge_mut(k).set_attr(key, value);
            }
        }
        Ok(())
    }
}

pub struct GmlWriter {
    path: PathBuf,
}

impl GmlWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GmlWriter { path: path.into() }
    }

    pub fn write<G>(&self, graph: &G) -> Result<(), WriteError>
    where
        G: DirectedGraph,
        G::NodeData: Attributed,
        G::EdgeData: Attributed,
    {
        info!(file = %self.path.display(), "writing GML graph");
        let mut out = BufWriter::new(create(&self.path)?);
        let fail = |_: std::io::Error| Report::new(WriteError::Io);

        writeln!(out, "graph [").map_err(fail)?;
        for (id, u) in graph.nodes().enumerate() {
            writeln!(out, "node [").map_err(fail)?;
            writeln!(out, "id {id}").map_err(fail)?;
            for (key, value) in graph.node(u).attrs() {
                writeln!(out, "{key} {value}").map_err(fail)?;
            }
            writeln!(out, "]").map_err(fail)?;
        }
        for u in graph.nodes() {
            for e in graph.out_edges(u) {
                writeln!(out, "edge [").map_err(fail)?;
                writeln!(out, "source {}", graph.node_rank(u)).map_err(fail)?;
                writeln!(out, "target {}", graph.node_rank(graph.target(e))).map_err(fail)?;
                for (key, value) in graph.edge(e).attrs() {
                    writeln!(out, "{key} {value}").map_err(fail)?;
                }
                writeln!(out, "]").map_err(fail)?;
            }
        }
        writeln!(out, "]").map_err(fail)?;
        Ok(())
    }
}

fn create(path: &Path) -> Result<File, WriteError> {
    File::create(path)
        .change_context(WriteError::Io)
        .attach_printable_lazy(|| format!("creating '{}'", path.display()))
}
