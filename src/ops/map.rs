//! The map operator and the mapper strategy trait.

use crate::error::Result;
use crate::record::{Record, RecordStream};
use std::collections::VecDeque;
use std::sync::Arc;

/// Per-record transformation strategy consumed by [`Map`].
///
/// A mapper turns one record into zero or more output records. It owns the
/// record it is handed and may rewrite it in place or synthesize fresh ones;
/// the engine does not rely on immutability. A failure is fatal to the run.
pub trait Mapper: Send + Sync {
    /// Transform one record into an output batch.
    fn map(&self, row: Record) -> Result<Vec<Record>>;
}

/// Applies a [`Mapper`] to every record, flattening the batches it returns
/// into the output stream.
///
/// Flattening is lazy per input record: the upstream is only pulled once the
/// previous record's batch is drained.
#[derive(Clone)]
pub struct Map {
    mapper: Arc<dyn Mapper>,
}

impl Map {
    pub fn new(mapper: impl Mapper + 'static) -> Self {
        Self {
            mapper: Arc::new(mapper),
        }
    }

    pub fn apply(&self, input: RecordStream) -> RecordStream {
        Box::new(MapIter {
            input,
            mapper: Arc::clone(&self.mapper),
            queue: VecDeque::new(),
            done: false,
        })
    }
}

struct MapIter {
    input: RecordStream,
    mapper: Arc<dyn Mapper>,
    queue: VecDeque<Record>,
    done: bool,
}

impl Iterator for MapIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.queue.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.input.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(row)) => match self.mapper.map(row) {
                    Ok(batch) => self.queue.extend(batch),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                },
            }
        }
    }
}
