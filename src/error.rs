//! Engine error kinds.
//!
//! Every failure mode of a run is a variant of [`Error`]. Errors travel
//! in-band: the consumer pulling from the terminal stream observes them as
//! `Err` items, after which the stream is fused. No operator attempts local
//! recovery or retry; records already handed downstream are retained and the
//! consumer decides whether to keep them.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal pipeline failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A join step reached execution without a side-graph to consume.
    #[error("join expects a second input stream, but none was attached")]
    WrongJoinArgument,

    /// A join input violated the key direction inferred from its first
    /// distinct keys.
    #[error("join input is not sorted by the join keys")]
    NotSorted,

    /// The external sort worker echoed a different number of records than it
    /// was sent, which signals worker or protocol corruption.
    #[error("sort worker echoed {returned} records for {sent} sent")]
    SortWorkerMismatch { sent: usize, returned: usize },

    /// The external sort worker died before echoing its end-of-output
    /// sentinel.
    #[error("sort worker terminated before echoing its input")]
    SortWorkerFailed,

    /// The external sort worker thread could not be spawned.
    #[error("failed to spawn sort worker")]
    SortWorkerSpawn(#[source] std::io::Error),

    /// `run` was invoked without a factory for a name a source requires.
    #[error("no input factory named `{0}` was bound for this run")]
    MissingInput(String),

    /// A mapper or reducer read a column absent from the record.
    #[error("record has no field `{0}`")]
    MissingField(String),

    /// A field held a value of the wrong kind for the requested operation.
    #[error("field `{field}` is not {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },

    /// A timestamp column did not parse.
    #[error("field `{field}` does not parse as a timestamp: `{value}`")]
    BadTimestamp { field: String, value: String },

    /// An input file could not be read.
    #[error("read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input line failed to parse into a record.
    #[error("{}:{line}", path.display())]
    ParseLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<Error>,
    },

    /// Malformed JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
