//! Graph file formats.
//!
//! Readers populate any [`pmgraph_graph::DirectedGraph`] and return the
//! descriptor table addressed by the file's node ids; writers number nodes
//! by rank. Failures carry the offending filename in their report. The
//! graph containers themselves never touch the filesystem.

mod dimacs10;
mod dimacs9;
mod dot;
mod error;
mod gml;
mod json;
mod tgf;

pub use dimacs10::{Dimacs10Reader, Dimacs10Writer};
pub use dimacs9::{Dimacs9DoubleReader, Dimacs9Reader};
pub use dot::DotWriter;
pub use error::{ReadError, WriteError};
pub use gml::{GmlReader, GmlWriter};
pub use json::JsonWriter;
pub use tgf::TgfReader;
