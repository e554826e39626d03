//! Graphviz dot output, mostly for eyeballing small graphs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use error_stack::{Report, Result, ResultExt};
use tracing::info;

use pmgraph_graph::{Attributed, DirectedGraph};

use crate::error::WriteError;

/// Writes `digraph { ... }` with nodes labeled by rank and payload
/// attributes rendered as attribute lists.
pub struct DotWriter {
    path: PathBuf,
}

impl DotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DotWriter { path: path.into() }
    }

    pub fn write<G>(&self, graph: &G) -> Result<(), WriteError>
    where
        G: DirectedGraph,
        G::NodeData: Attributed,
        G::EdgeData: Attributed,
    {
        info!(file = %self.path.display(), "writing dot graph");
        let mut out = BufWriter::new(
            File::create(&self.path)
                .change_context(WriteError::Io)
                .attach_printable_lazy(|| format!("creating '{}'", self.path.display()))?,
        );
        let fail = |_: std::io::Error| Report::new(WriteError::Io);

        writeln!(out, "digraph {{").map_err(fail)?;
        writeln!(out, "    node [fontname=\"Arial\"]").map_err(fail)?;
        for (id, u) in graph.nodes().enumerate() {
            writeln!(out, "    n{id} [label=\"{}\"]", render(graph.node(u).attrs(), id))
                .map_err(fail)?;
        }
        for u in graph.nodes() {
            for e in graph.out_edges(u) {
                let label = graph
                    .edge(e)
                    .attrs()
                    .into_iter()
                    .map(|(_, value)| value)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    out,
                    "    n{} -> n{}",
                    graph.node_rank(u),
                    graph.node_rank(graph.target(e))
                )
                .map_err(fail)?;
                if label.is_empty() {
                    writeln!(out).map_err(fail)?;
                } else {
                    writeln!(out, " [label=\"{label}\"]").map_err(fail)?;
                }
            }
        }
        writeln!(out, "}}").map_err(fail)?;
        Ok(())
    }
}

fn render(attrs: Vec<(&'static str, String)>, id: usize) -> String {
    if attrs.is_empty() {
        return id.to_string();
    }
    let rendered: Vec<String> = attrs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    format!("{id}|{}", rendered.join(","))
}
