//! Basic reducers: First, Count, Sum.

use crate::error::{Error, Result};
use crate::ops::Reducer;
use crate::record::{field, Record, Value};

/// Copy the group-key fields of `from` into a fresh record.
fn keyed_record(group_key: &[String], from: &Record) -> Record {
    let mut out = Record::new();
    for key in group_key {
        out.insert(
            key.clone(),
            from.get(key).cloned().unwrap_or(Value::Null),
        );
    }
    out
}

/// Keep only the first record of each group.
pub struct First;

impl Reducer for First {
    fn reduce(&self, _group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>> {
        Ok(rows.into_iter().take(1).collect())
    }
}

/// Emit one record per group: the group-key fields plus the group size.
pub struct Count {
    column: String,
}

impl Count {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Count {
    fn reduce(&self, group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>> {
        let Some(last) = rows.last() else {
            return Ok(Vec::new());
        };
        let mut out = keyed_record(group_key, last);
        out.insert(self.column.clone(), Value::from(rows.len()));
        Ok(vec![out])
    }
}

/// Emit one record per group: the group-key fields plus the column's sum.
///
/// All-integer inputs sum to an integer (falling back to a float on
/// overflow); any float input produces a float.
pub struct Sum {
    column: String,
}

impl Sum {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Reducer for Sum {
    fn reduce(&self, group_key: &[String], rows: Vec<Record>) -> Result<Vec<Record>> {
        let Some(last) = rows.last() else {
            return Ok(Vec::new());
        };
        let mut int_sum: Option<i64> = Some(0);
        let mut float_sum = 0.0_f64;
        for row in &rows {
            let Value::Number(n) = field(row, &self.column)? else {
                return Err(Error::FieldType {
                    field: self.column.clone(),
                    expected: "numeric",
                });
            };
            int_sum = match (int_sum, n.as_i64()) {
                (Some(acc), Some(i)) => acc.checked_add(i),
                _ => None,
            };
            float_sum += n.as_f64().ok_or_else(|| Error::FieldType {
                field: self.column.clone(),
                expected: "numeric",
            })?;
        }
        let mut out = keyed_record(group_key, last);
        let value = match int_sum {
            Some(i) => Value::from(i),
            None => Value::from(float_sum),
        };
        out.insert(self.column.clone(), value);
        Ok(vec![out])
    }
}
