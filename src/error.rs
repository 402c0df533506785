//! Error types for codetint

use std::ops::Range;

use thiserror::Error;

use crate::host::{NodeId, NodeKind};

/// Result type alias for codetint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine and host error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid theme: {0}")]
    Theme(#[from] toml::de::Error),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No such node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Range {range:?} out of bounds for node {node:?} (length {len})")]
    RangeOutOfBounds {
        node: NodeId,
        range: Range<usize>,
        len: usize,
    },

    /// A node has a different type than the operation requires
    #[error("Unexpected node {node:?}: expected {expected:?}, found {found:?}")]
    UnexpectedKind {
        node: NodeId,
        expected: NodeKind,
        found: NodeKind,
    },

    /// Token lengths did not add up to the text they were produced from
    #[error("Tokenizer for mode {mode:?} covered {covered} of {expected} characters")]
    TokenizerDesync {
        mode: String,
        expected: usize,
        covered: usize,
    },

    #[error("Cannot insert a table into a {0:?}")]
    UnsupportedParent(NodeKind),

    #[error("{0}")]
    Message(String),
}
