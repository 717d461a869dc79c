//! Error taxonomy for the registry compiler
//!
//! Every failure aborts the whole run: the generator is a deterministic,
//! offline, single-shot compiler, so there is no retry policy anywhere.

use thiserror::Error;

/// Errors raised while compiling a registry into table artifacts
#[derive(Error, Debug)]
pub enum GenError {
    /// Malformed or self-contradictory registry input: duplicate command
    /// names, aliases with unknown or themselves-aliased targets, struct
    /// alias cycles, extensions missing required attributes
    #[error("registry error: {0}")]
    Registry(String),

    /// A category outgrew the integer width reserved for one of its tables
    #[error("capacity error: {0}")]
    Capacity(String),

    /// Two requirement sources disagree on monotonic version ordering
    #[error("consistency error: {0}")]
    Consistency(String),

    /// Registry document is not well-formed XML
    #[error("malformed registry XML: {0}")]
    Xml(#[from] xml::reader::Error),

    #[error("artifact serialization: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;

impl GenError {
    /// Shorthand for a `Registry` error with formatted context
    pub fn registry(msg: impl Into<String>) -> Self {
        GenError::Registry(msg.into())
    }
}
