//! Largest-N selection per group.

use crate::error::Result;
use crate::ops::Reducer;
use crate::record::{cmp_values, field, Record, Value};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Keep the `n` records with the largest values in a column.
///
/// Backed by an n-sized min-heap keyed by `(value, arrival-index)`, so
/// memory is bounded by `n` and, among records with equal values, later
/// arrivals displace earlier ones. Survivors are emitted in ascending
/// `(value, arrival-index)` order.
pub struct TopN {
    column: String,
    n: usize,
}

impl TopN {
    pub fn new(column: impl Into<String>, n: usize) -> Self {
        Self {
            column: column.into(),
            n,
        }
    }
}

struct Entry {
    value: Value,
    arrival: usize,
    row: Record,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_values(&self.value, &other.value).then(self.arrival.cmp(&other.arrival))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Reducer for TopN {
    fn reduce(&self, _group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>> {
        if self.n == 0 {
            return Ok(Vec::new());
        }
        let mut heap: BinaryHeap<Reverse<Entry>> = BinaryHeap::with_capacity(self.n + 1);
        for (arrival, row) in rows.into_iter().enumerate() {
            let value = field(&row, &self.column)?.clone();
            heap.push(Reverse(Entry {
                value,
                arrival,
                row,
            }));
            if heap.len() > self.n {
                heap.pop(); // drop the smallest survivor
            }
        }
        let mut survivors: Vec<Entry> = heap.into_iter().map(|Reverse(e)| e).collect();
        survivors.sort();
        Ok(survivors.into_iter().map(|e| e.row).collect())
    }
}
