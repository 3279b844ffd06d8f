//! Streaming operators.
//!
//! Every operator consumes one (or, for [`Join`], two) upstream
//! [`RecordStream`](crate::RecordStream)s and returns a lazy stream. The
//! shared contract:
//!
//! - **Pull-driven**: nothing runs until the consumer asks for the next
//!   record; an operator may pause arbitrarily long between emissions.
//! - **Bounded eagerness**: operators buffer no more than the next emitted
//!   record requires. The exceptions are per-group: reduce materializes one
//!   group at a time, the external sort buffers one run inside its worker,
//!   and join materializes the current group of each side.
//! - **Single use**: an `apply` call wires up fresh state; re-execution goes
//!   back through the owning [`Graph`](crate::Graph).
//! - **In-band failure**: an error fuses the stream after it is yielded.

mod join;
mod map;
mod reduce;
mod sort;
mod source;

pub use join::{InnerJoiner, Join, JoinState, Joiner, LeftJoiner, OuterJoiner, RightJoiner};
pub use map::{Map, Mapper};
pub use reduce::{Reduce, Reducer};
pub use sort::{ExternalSort, SortSpec};
pub use source::{FileSource, IterSource};

use crate::error::Result;
use crate::record::{cmp_keys, key_values, Record, RecordStream, Value};
use std::cmp::Ordering;

/// Splits a record stream into maximal adjacent runs equal on `keys`.
///
/// Detection is by adjacency only; the upstream must already be sorted on
/// `keys` for runs to coincide with logical groups. An empty key list yields
/// a single run spanning the whole stream. An upstream error ends iteration
/// after being yielded; a partially collected run is dropped with it.
pub(crate) struct Groups {
    input: RecordStream,
    keys: Vec<String>,
    pending: Option<(Vec<Value>, Record)>,
    done: bool,
}

impl Groups {
    pub(crate) fn new(input: RecordStream, keys: Vec<String>) -> Self {
        Self {
            input,
            keys,
            pending: None,
            done: false,
        }
    }
}

impl Iterator for Groups {
    type Item = Result<(Vec<Value>, Vec<Record>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (key, first) = match self.pending.take() {
            Some(seed) => seed,
            None => match self.input.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(row)) => (key_values(&row, &self.keys), row),
            },
        };
        let mut rows = vec![first];
        loop {
            match self.input.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(row)) => {
                    let next_key = key_values(&row, &self.keys);
                    if cmp_keys(&next_key, &key) == Ordering::Equal {
                        rows.push(row);
                    } else {
                        self.pending = Some((next_key, row));
                        break;
                    }
                }
            }
        }
        Some(Ok((key, rows)))
    }
}
