//! External sort: grouped sorting delegated to a sibling worker.
//!
//! The driver never buffers a run itself. For every group-key-equal run it
//! spawns a worker thread, streams the run's records over a channel framed
//! as `Some(record)` with a `None` end-of-input sentinel, and then yields
//! whatever the worker echoes back until the worker's own `None` sentinel
//! arrives. The worker buffers, sorts, and echoes; the O(run) memory lives
//! on its heap, not in the driver's working set.
//!
//! Tearing down the terminal stream drops the channel endpoints, which the
//! worker observes as a disconnect and exits on.

use crate::error::{Error, Result};
use crate::record::{cmp_keys, key_values, Record, RecordStream, Value};
use std::cmp::Ordering;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::JoinHandle;
use std::{sync::mpsc, thread};
use tracing::debug;

/// Sort configuration: key fields, direction, and optional run partitioning.
///
/// ```
/// use rowflow::SortSpec;
///
/// let spec = SortSpec::by(&["count", "text"]).descending().per_group(&["doc_id"]);
/// ```
#[derive(Clone, Debug)]
pub struct SortSpec {
    pub(crate) keys: Vec<String>,
    pub(crate) reverse: bool,
    pub(crate) group_keys: Vec<String>,
}

impl SortSpec {
    /// Ascending sort over the given key fields.
    pub fn by(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
            reverse: false,
            group_keys: Vec::new(),
        }
    }

    /// Invert the order globally across the whole key sequence.
    pub fn descending(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Sort each adjacent run equal on `keys` independently, keeping the
    /// runs in arrival order.
    pub fn per_group(mut self, keys: &[&str]) -> Self {
        self.group_keys = keys.iter().map(|k| (*k).to_owned()).collect();
        self
    }
}

/// Reorders records by a key inside a cooperating sibling worker.
///
/// With group keys configured, each run gets its own worker, created and
/// torn down per run, so peak buffer size is bounded by a single group and
/// records from different groups are never interleaved. The driver checks
/// that the worker echoed exactly as many records as it was sent.
#[derive(Clone)]
pub struct ExternalSort {
    spec: SortSpec,
}

impl ExternalSort {
    pub fn new(spec: SortSpec) -> Self {
        Self { spec }
    }

    pub fn apply(&self, input: RecordStream) -> RecordStream {
        Box::new(SortIter {
            input,
            spec: self.spec.clone(),
            pending: None,
            drain: None,
            input_done: false,
            failed: false,
        })
    }
}

/// A worker mid-echo: its receiving endpoint plus the count ledger.
struct Drain {
    rx: Receiver<Option<Record>>,
    handle: Option<JoinHandle<()>>,
    sent: usize,
    returned: usize,
}

struct SortIter {
    input: RecordStream,
    spec: SortSpec,
    pending: Option<(Vec<Value>, Record)>,
    drain: Option<Drain>,
    input_done: bool,
    failed: bool,
}

impl SortIter {
    fn fail(&mut self, e: Error) -> Option<Result<Record>> {
        self.failed = true;
        self.drain = None;
        Some(Err(e))
    }

    /// First record of the next run, either stashed from the previous run or
    /// pulled fresh. `Ok(None)` means the input is exhausted.
    fn seed(&mut self) -> Result<Option<(Vec<Value>, Record)>> {
        if let Some(seed) = self.pending.take() {
            return Ok(Some(seed));
        }
        if self.input_done {
            return Ok(None);
        }
        match self.input.next() {
            None => {
                self.input_done = true;
                Ok(None)
            }
            Some(Err(e)) => Err(e),
            Some(Ok(row)) => {
                let key = key_values(&row, &self.spec.group_keys);
                Ok(Some((key, row)))
            }
        }
    }
}

impl Iterator for SortIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(drain) = self.drain.as_mut() {
                match drain.rx.recv() {
                    Ok(Some(row)) => {
                        drain.returned += 1;
                        return Some(Ok(row));
                    }
                    Ok(None) => {}
                    Err(_) => return self.fail(Error::SortWorkerFailed),
                }
                // Output sentinel received: reap the worker and settle the
                // ledger before opening the next run.
                let mut drain = self.drain.take().expect("drain is active");
                if let Some(handle) = drain.handle.take() {
                    let _ = handle.join();
                }
                debug!(records = drain.returned, "sort worker finished run");
                if drain.returned != drain.sent {
                    return self.fail(Error::SortWorkerMismatch {
                        sent: drain.sent,
                        returned: drain.returned,
                    });
                }
                continue;
            }

            // No live worker: open the next run, or finish.
            let (group_key, first) = match self.seed() {
                Ok(Some(seed)) => seed,
                Ok(None) => return None,
                Err(e) => return self.fail(e),
            };

            let (to_worker, from_driver) = mpsc::channel::<Option<Record>>();
            let (to_driver, from_worker) = mpsc::channel::<Option<Record>>();
            let keys = self.spec.keys.clone();
            let reverse = self.spec.reverse;
            let handle = match thread::Builder::new()
                .name("rowflow-sort".into())
                .spawn(move || sort_worker(from_driver, to_driver, &keys, reverse))
            {
                Ok(handle) => handle,
                Err(e) => return self.fail(Error::SortWorkerSpawn(e)),
            };

            let mut sent = 0;
            if to_worker.send(Some(first)).is_err() {
                return self.fail(Error::SortWorkerFailed);
            }
            sent += 1;

            // Forward the rest of the run, stopping at the first record of
            // the next group.
            loop {
                match self.input.next() {
                    None => {
                        self.input_done = true;
                        break;
                    }
                    Some(Err(e)) => return self.fail(e),
                    Some(Ok(row)) => {
                        let key = key_values(&row, &self.spec.group_keys);
                        if cmp_keys(&key, &group_key) != Ordering::Equal {
                            self.pending = Some((key, row));
                            break;
                        }
                        if to_worker.send(Some(row)).is_err() {
                            return self.fail(Error::SortWorkerFailed);
                        }
                        sent += 1;
                    }
                }
            }

            if to_worker.send(None).is_err() {
                return self.fail(Error::SortWorkerFailed);
            }
            debug!(records = sent, "run handed to sort worker");
            self.drain = Some(Drain {
                rx: from_worker,
                handle: Some(handle),
                sent,
                returned: 0,
            });
        }
    }
}

/// Worker half of the sort protocol.
///
/// Buffers frames until the input sentinel, sorts stably by the key fields,
/// echoes the records followed by the output sentinel, and terminates. A
/// disconnected channel means the driver went away; the worker just exits.
fn sort_worker(
    rx: Receiver<Option<Record>>,
    tx: Sender<Option<Record>>,
    keys: &[String],
    reverse: bool,
) {
    let mut rows: Vec<Record> = Vec::new();
    loop {
        match rx.recv() {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => break,
            Err(_) => return,
        }
    }
    let mut keyed: Vec<(Vec<Value>, Record)> = rows
        .into_iter()
        .map(|row| (key_values(&row, keys), row))
        .collect();
    keyed.sort_by(|a, b| {
        let ord = cmp_keys(&a.0, &b.0);
        if reverse { ord.reverse() } else { ord }
    });
    for (_, row) in keyed {
        if tx.send(Some(row)).is_err() {
            return;
        }
    }
    let _ = tx.send(None);
}
