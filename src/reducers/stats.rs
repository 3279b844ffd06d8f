//! Statistical reducers: term frequency and mean speed.

use crate::error::Result;
use crate::ops::Reducer;
use crate::record::{number_field, string_field, Record, Value};
use std::collections::HashMap;

/// Relative frequency of each distinct value of a words column within the
/// group.
///
/// Emits one record per distinct word -- group-key fields, the word, and
/// `count / group size` -- in first-appearance order.
pub struct TermFrequency {
    words_column: String,
    result_column: String,
}

impl TermFrequency {
    pub fn new(words_column: impl Into<String>, result_column: impl Into<String>) -> Self {
        Self {
            words_column: words_column.into(),
            result_column: result_column.into(),
        }
    }
}

impl Reducer for TermFrequency {
    fn reduce(&self, group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>> {
        let total = rows.len();
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut skeletons: Vec<(String, Record)> = Vec::new();
        for row in &rows {
            let word = string_field(row, &self.words_column)?.to_owned();
            let count = counts.entry(word.clone()).or_insert(0);
            if *count == 0 {
                let mut skeleton = Record::new();
                for key in group_key {
                    skeleton.insert(key.clone(), row.get(key).cloned().unwrap_or(Value::Null));
                }
                skeleton.insert(self.words_column.clone(), Value::String(word.clone()));
                skeletons.push((word, skeleton));
            }
            *count += 1;
        }
        Ok(skeletons
            .into_iter()
            .map(|(word, mut skeleton)| {
                let frequency = counts[&word] as f64 / total as f64;
                skeleton.insert(self.result_column.clone(), Value::from(frequency));
                skeleton
            })
            .collect())
    }
}

/// Mean speed of a group: total distance over total time.
///
/// Emits one record per group with the group-key fields and
/// `Σ distance / Σ time`.
pub struct MeanSpeed {
    result_column: String,
    distance_column: String,
    time_column: String,
}

impl MeanSpeed {
    pub fn new(
        result_column: impl Into<String>,
        distance_column: impl Into<String>,
        time_column: impl Into<String>,
    ) -> Self {
        Self {
            result_column: result_column.into(),
            distance_column: distance_column.into(),
            time_column: time_column.into(),
        }
    }
}

impl Reducer for MeanSpeed {
    fn reduce(&self, group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let mut out = Record::new();
        for key in group_key {
            out.insert(key.clone(), first.get(key).cloned().unwrap_or(Value::Null));
        }
        let mut distance = 0.0_f64;
        let mut time = 0.0_f64;
        for row in &rows {
            distance += number_field(row, &self.distance_column)?;
            time += number_field(row, &self.time_column)?;
        }
        out.insert(self.result_column.clone(), Value::from(distance / time));
        Ok(vec![out])
    }
}
