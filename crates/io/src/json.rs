//! JSON graph writer: `{"graph": {"nodes": [...], "edges": [...]}}`.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use error_stack::{Result, ResultExt};
use serde_json::{json, Map, Value};
use tracing::info;

use pmgraph_graph::{Attributed, DirectedGraph};

use crate::error::WriteError;

pub struct JsonWriter {
    path: PathBuf,
}

impl JsonWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonWriter { path: path.into() }
    }

    pub fn write<G>(&self, graph: &G) -> Result<(), WriteError>
    where
        G: DirectedGraph,
        G::NodeData: Attributed,
        G::EdgeData: Attributed,
    {
        info!(file = %self.path.display(), "writing JSON graph");
        let nodes: Vec<Value> = graph
            .nodes()
            .enumerate()
            .map(|(id, u)| {
                let mut record = Map::new();
                record.insert("id".into(), json!(id));
                for (key, value) in graph.node(u).attrs() {
                    record.insert(key.into(), json!(value));
                }
                Value::Object(record)
            })
            .collect();

        let mut edges = Vec::with_capacity(graph.num_edges());
        for u in graph.nodes() {
            for e in graph.out_edges(u) {
                let mut record = Map::new();
                record.insert("s".into(), json!(graph.node_rank(u)));
                record.insert("t".into(), json!(graph.node_rank(graph.target(e))));
                for (key, value) in graph.edge(e).attrs() {
                    record.insert(key.into(), json!(value));
                }
                edges.push(Value::Object(record));
            }
        }

        let document = json!({ "graph": { "nodes": nodes, "edges": edges } });
        let out = BufWriter::new(
            File::create(&self.path)
                .change_context(WriteError::Io)
                .attach_printable_lazy(|| format!("creating '{}'", self.path.display()))?,
        );
        serde_json::to_writer_pretty(out, &document)
            .change_context(WriteError::Io)
            .attach_printable_lazy(|| format!("writing '{}'", self.path.display()))
    }
}
