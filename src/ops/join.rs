//! Sort-merge join over two key-sorted record streams.
//!
//! Both inputs must arrive sorted by the join keys in a consistent
//! direction. The operator does not pick the direction up front: it infers
//! it from the first two distinct keys seen on either side and from then on
//! rejects any out-of-order transition as [`Error::NotSorted`].
//!
//! The merge itself is the classic two-pointer walk. At each step the
//! *lagging* side -- the side whose current key can no longer be matched by
//! the other side's future keys under the inferred direction -- is handed to
//! the joiner against an empty opposite group; equal keys hand both groups
//! over and advance both sides.
//!
//! Field-name collisions between the two sides are resolved by suffixing
//! (see [`JoinState`]); the collision set is created fresh for every
//! `apply`, so no schema decision leaks across runs or join steps.

use super::Groups;
use crate::error::{Error, Result};
use crate::record::{cmp_keys, Record, RecordStream, Value};
use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::trace;

/// Default suffix for fields originating on the first (driving) side.
const SUFFIX_A: &str = "_1";
/// Default suffix for fields originating on the second (joined) side.
const SUFFIX_B: &str = "_2";

/// Collision bookkeeping for one join operation.
///
/// A non-key field observed on both sides becomes a *collision*: both copies
/// are emitted under suffixed names instead of a single field. Collisions
/// are sticky -- once a field has collided, every later record carrying it
/// receives the suffix treatment, which keeps the output schema consistent
/// across the emitted batch.
#[derive(Default)]
pub struct JoinState {
    duplicates: HashSet<String>,
}

impl JoinState {
    /// Record that `field` exists on both sides.
    pub fn mark_collision(&mut self, field: impl Into<String>) {
        self.duplicates.insert(field.into());
    }

    /// Has `field` been seen to collide during this operation?
    pub fn is_collision(&self, field: &str) -> bool {
        self.duplicates.contains(field)
    }
}

/// Per-key-pair combination strategy consumed by [`Join`].
///
/// Exactly one of `group_a` / `group_b` may be empty, meaning the other
/// side's key had no partner. Implementations decide what survives; the
/// provided strategies cover the four relational join flavors.
pub trait Joiner: Send + Sync {
    /// Combine one pair of key-equal groups into an output batch.
    fn join(
        &self,
        keys: &[String],
        group_a: &[Record],
        group_b: &[Record],
        state: &mut JoinState,
    ) -> Vec<Record>;
}

/// Merge two sorted streams on a shared key sequence.
///
/// The first group of each side is materialized per join step: the joiner
/// may traverse side A once per side-B row, and the cross product is emitted
/// B-major. Group boundaries come from the same adjacency rule the reduce
/// operator uses.
#[derive(Clone)]
pub struct Join {
    joiner: Arc<dyn Joiner>,
    keys: Vec<String>,
}

impl Join {
    pub fn new(joiner: impl Joiner + 'static, keys: &[&str]) -> Self {
        Self {
            joiner: Arc::new(joiner),
            keys: keys.iter().map(|k| (*k).to_owned()).collect(),
        }
    }

    pub fn apply(&self, left: RecordStream, right: RecordStream) -> RecordStream {
        Box::new(JoinIter {
            joiner: Arc::clone(&self.joiner),
            keys: self.keys.clone(),
            left: Side::new(Groups::new(left, self.keys.clone())),
            right: Side::new(Groups::new(right, self.keys.clone())),
            descending: None,
            state: JoinState::default(),
            queue: VecDeque::new(),
            started: false,
            failed: false,
        })
    }
}

/// One input of the merge: its grouper plus the sortedness ledger.
struct Side {
    groups: Groups,
    prev: Option<Vec<Value>>,
    current: Option<(Vec<Value>, Vec<Record>)>,
    exhausted: bool,
}

impl Side {
    fn new(groups: Groups) -> Self {
        Self {
            groups,
            prev: None,
            current: None,
            exhausted: false,
        }
    }

    /// Pull the next group, checking each key transition against the shared
    /// inferred direction (and fixing the direction on the first distinct
    /// pair seen anywhere).
    fn advance(&mut self, descending: &mut Option<bool>) -> Result<()> {
        self.current = None;
        if self.exhausted {
            return Ok(());
        }
        match self.groups.next() {
            None => {
                self.exhausted = true;
                Ok(())
            }
            Some(Err(e)) => {
                self.exhausted = true;
                Err(e)
            }
            Some(Ok((key, rows))) => {
                if let Some(prev) = &self.prev {
                    // Adjacent group keys always differ; classify the step.
                    let step_down = cmp_keys(&key, prev) == Ordering::Less;
                    match descending {
                        None => {
                            trace!(descending = step_down, "inferred join key direction");
                            *descending = Some(step_down);
                        }
                        Some(d) if *d != step_down => return Err(Error::NotSorted),
                        Some(_) => {}
                    }
                }
                self.prev = Some(key.clone());
                self.current = Some((key, rows));
                Ok(())
            }
        }
    }

    fn take(&mut self) -> (Vec<Value>, Vec<Record>) {
        self.current.take().expect("side holds a group")
    }
}

struct JoinIter {
    joiner: Arc<dyn Joiner>,
    keys: Vec<String>,
    left: Side,
    right: Side,
    descending: Option<bool>,
    state: JoinState,
    queue: VecDeque<Record>,
    started: bool,
    failed: bool,
}

impl JoinIter {
    fn advance_left(&mut self) -> Result<()> {
        self.left.advance(&mut self.descending)
    }

    fn advance_right(&mut self) -> Result<()> {
        self.right.advance(&mut self.descending)
    }
}

impl Iterator for JoinIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.queue.pop_front() {
                return Some(Ok(row));
            }
            if self.failed {
                return None;
            }
            if !self.started {
                self.started = true;
                if let Err(e) = self.advance_left().and_then(|()| self.advance_right()) {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
            let step = match (&self.left.current, &self.right.current) {
                (None, None) => return None,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some((ka, _)), Some((kb, _))) => {
                    let ord = cmp_keys(ka, kb);
                    // Under a descending key direction the larger key is the
                    // lagging one.
                    if self.descending == Some(true) {
                        ord.reverse()
                    } else {
                        ord
                    }
                }
            };
            let result = match step {
                Ordering::Equal => {
                    let (_, ga) = self.left.take();
                    let (_, gb) = self.right.take();
                    let out = self.joiner.join(&self.keys, &ga, &gb, &mut self.state);
                    self.queue.extend(out);
                    self.advance_left().and_then(|()| self.advance_right())
                }
                Ordering::Less => {
                    let (_, ga) = self.left.take();
                    let out = self.joiner.join(&self.keys, &ga, &[], &mut self.state);
                    self.queue.extend(out);
                    self.advance_left()
                }
                Ordering::Greater => {
                    let (_, gb) = self.right.take();
                    let out = self.joiner.join(&self.keys, &[], &gb, &mut self.state);
                    self.queue.extend(out);
                    self.advance_right()
                }
            };
            if let Err(e) = result {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

/// Cross product of two key-equal groups with collision suffixing, emitted
/// B-major (every side-A row per side-B row).
fn cross_join(
    keys: &[String],
    group_a: &[Record],
    group_b: &[Record],
    suffix_a: &str,
    suffix_b: &str,
    state: &mut JoinState,
) -> Vec<Record> {
    let mut out = Vec::with_capacity(group_a.len() * group_b.len());
    for row_b in group_b {
        for row_a in group_a {
            for field in row_a.keys() {
                if !keys.contains(field) && row_b.contains_key(field) {
                    state.mark_collision(field.clone());
                }
            }
            let mut merged = Record::new();
            for (field, value) in row_b {
                if !keys.contains(field) && state.is_collision(field) {
                    merged.insert(format!("{field}{suffix_b}"), value.clone());
                } else {
                    merged.insert(field.clone(), value.clone());
                }
            }
            for (field, value) in row_a {
                if keys.contains(field) {
                    continue; // key fields already carried over from side B
                }
                if state.is_collision(field) {
                    merged.insert(format!("{field}{suffix_a}"), value.clone());
                } else {
                    merged.insert(field.clone(), value.clone());
                }
            }
            out.push(merged);
        }
    }
    out
}

/// Pass one side through unmatched, suffixing any field already known to
/// collide during this operation.
fn suffix_rows(rows: &[Record], suffix: &str, state: &JoinState) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut out = Record::new();
            for (field, value) in row {
                if state.is_collision(field) {
                    out.insert(format!("{field}{suffix}"), value.clone());
                } else {
                    out.insert(field.clone(), value.clone());
                }
            }
            out
        })
        .collect()
}

macro_rules! suffixed_joiner {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name {
            suffix_a: String,
            suffix_b: String,
        }

        impl $name {
            /// Strategy with the default `_1` / `_2` suffixes.
            pub fn new() -> Self {
                Self::with_suffixes(SUFFIX_A, SUFFIX_B)
            }

            /// Strategy with caller-chosen collision suffixes.
            pub fn with_suffixes(suffix_a: impl Into<String>, suffix_b: impl Into<String>) -> Self {
                Self {
                    suffix_a: suffix_a.into(),
                    suffix_b: suffix_b.into(),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

suffixed_joiner! {
    /// Keys present on both sides survive; anything unmatched is dropped.
    InnerJoiner
}

impl Joiner for InnerJoiner {
    fn join(
        &self,
        keys: &[String],
        group_a: &[Record],
        group_b: &[Record],
        state: &mut JoinState,
    ) -> Vec<Record> {
        if group_a.is_empty() || group_b.is_empty() {
            return Vec::new();
        }
        cross_join(keys, group_a, group_b, &self.suffix_a, &self.suffix_b, state)
    }
}

suffixed_joiner! {
    /// Every side-A row survives; side-B rows survive only when matched.
    LeftJoiner
}

impl Joiner for LeftJoiner {
    fn join(
        &self,
        keys: &[String],
        group_a: &[Record],
        group_b: &[Record],
        state: &mut JoinState,
    ) -> Vec<Record> {
        if group_a.is_empty() {
            Vec::new()
        } else if group_b.is_empty() {
            suffix_rows(group_a, &self.suffix_a, state)
        } else {
            cross_join(keys, group_a, group_b, &self.suffix_a, &self.suffix_b, state)
        }
    }
}

suffixed_joiner! {
    /// Every side-B row survives; side-A rows survive only when matched.
    RightJoiner
}

impl Joiner for RightJoiner {
    fn join(
        &self,
        keys: &[String],
        group_a: &[Record],
        group_b: &[Record],
        state: &mut JoinState,
    ) -> Vec<Record> {
        if group_a.is_empty() {
            suffix_rows(group_b, &self.suffix_b, state)
        } else if group_b.is_empty() {
            Vec::new()
        } else {
            cross_join(keys, group_a, group_b, &self.suffix_a, &self.suffix_b, state)
        }
    }
}

suffixed_joiner! {
    /// Every row from either side survives.
    OuterJoiner
}

impl Joiner for OuterJoiner {
    fn join(
        &self,
        keys: &[String],
        group_a: &[Record],
        group_b: &[Record],
        state: &mut JoinState,
    ) -> Vec<Record> {
        if group_a.is_empty() {
            suffix_rows(group_b, &self.suffix_b, state)
        } else if group_b.is_empty() {
            suffix_rows(group_a, &self.suffix_a, state)
        } else {
            cross_join(keys, group_a, group_b, &self.suffix_a, &self.suffix_b, state)
        }
    }
}
