//! The reduce operator and the reducer strategy trait.

use super::Groups;
use crate::error::Result;
use crate::record::{Record, RecordStream};
use std::collections::VecDeque;
use std::sync::Arc;

/// Per-group aggregation strategy consumed by [`Reduce`].
///
/// A reducer folds one group into zero or more output records. `group_key`
/// names the configured key fields; `rows` is the group's records in arrival
/// order. A failure is fatal to the run.
pub trait Reducer: Send + Sync {
    /// Fold one group into an output batch.
    fn reduce(&self, group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>>;
}

/// Partitions its input into adjacent-equal groups on the configured keys
/// and applies a [`Reducer`] to each.
///
/// Grouping is by adjacency, so the upstream must already be sorted on the
/// keys. One group is materialized at a time; an empty key list treats the
/// whole stream as a single group.
#[derive(Clone)]
pub struct Reduce {
    reducer: Arc<dyn Reducer>,
    keys: Vec<String>,
}

impl Reduce {
    pub fn new(reducer: impl Reducer + 'static, keys: &[&str]) -> Self {
        Self {
            reducer: Arc::new(reducer),
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    pub fn apply(&self, input: RecordStream) -> RecordStream {
        Box::new(ReduceIter {
            groups: Groups::new(input, self.keys.clone()),
            reducer: Arc::clone(&self.reducer),
            keys: self.keys.clone(),
            queue: VecDeque::new(),
            done: false,
        })
    }
}

struct ReduceIter {
    groups: Groups,
    reducer: Arc<dyn Reducer>,
    keys: Vec<String>,
    queue: VecDeque<Record>,
    done: bool,
}

impl Iterator for ReduceIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.queue.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.groups.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok((_, rows))) => match self.reducer.reduce(&self.keys, rows) {
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
