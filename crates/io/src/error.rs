use core::fmt::{Display, Formatter};

use error_stack::Context;

/// Failure while reading a graph file. The offending filename is attached
/// to the report at the call site.
#[derive(Debug)]
pub enum ReadError {
    Io,
    Parse,
    Format,
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "could not read graph file"),
            Self::Parse => write!(f, "malformed value in graph file"),
            Self::Format => write!(f, "graph file violates its format"),
        }
    }
}

impl Context for ReadError {}

/// Failure while writing a graph file.
#[derive(Debug)]
pub enum WriteError {
    Io,
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "could not write graph file"),
        }
    }
}

impl Context for WriteError {}
