use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Which of the two input sequences an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug)]
pub enum StrandError {
    /// A token sequence contains the reserved gap sentinel (or a non-positive value)
    InvalidInput { side: Side, position: usize },

    /// Too many distinct markup tags to fit the token encoding
    TooManyTags(usize),

    /// The move table can't guarantee that every cell is reachable
    InvalidMoveTable(String),

    /// Traceback reached a cell without a recorded move before arriving at (0, 0)
    UnreachableState { source_pos: usize, target_pos: usize },

    /// Traceback could not find a move reproducing the score of a cell. This is a bug.
    InternalInconsistency { source_pos: usize, target_pos: usize },

    /// The DP matrix for the given dimensions does not fit in memory
    MatrixTooLarge { rows: usize, cols: usize },

    /// Error variant when we couldn't read from a file
    FileReadError { source: io::Error },

    /// Error variant when a configuration or result could not be (de)serialized
    SerializationError { source: serde_json::Error },

    /// Other IO errors
    IOError(io::Error),

    /// Other miscellaneous strand errors
    Other,
}

impl Error for StrandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::FileReadError { ref source } => Some(source),
            Self::SerializationError { ref source } => Some(source),
            Self::IOError(ref source) => Some(source),
            _ => None
        }
    }
}

impl From<io::Error> for StrandError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<serde_json::Error> for StrandError {
    fn from(value: serde_json::Error) -> Self {
        Self::SerializationError {
            source: value
        }
    }
}

impl Display for StrandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::InvalidInput { side, position } =>
                write!(f, "The {side} sequence contains a non-positive token at position {position}! Zero is reserved as the gap sentinel."),
            Self::TooManyTags(n) =>
                write!(f, "Too many distinct markup tags ({n}) to encode!"),
            Self::InvalidMoveTable(ref reason) =>
                write!(f, "Invalid move table: {reason}"),
            Self::UnreachableState { source_pos, target_pos } =>
                write!(f, "Traceback reached unreachable cell ({source_pos}, {target_pos}); the move table can't align these sequences."),
            Self::InternalInconsistency { source_pos, target_pos } =>
                write!(f, "Internal inconsistency: no move reproduces the score of cell ({source_pos}, {target_pos})!"),
            Self::MatrixTooLarge { rows, cols } =>
                write!(f, "Alignment matrix of {rows} x {cols} cells is too large!"),
            Self::FileReadError { source: _ } =>
                write!(f, "Could not read from file!"),
            Self::SerializationError { source: _ } =>
                write!(f, "Could not (de)serialize JSON data!"),
            Self::IOError(ref err) =>
                err.fmt(f),
            Self::Other =>
                write!(f, "Strand error!")
        }
    }
}
