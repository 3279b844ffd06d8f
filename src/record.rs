//! The record data model and the lazy stream contract.
//!
//! This module defines:
//! - [`Record`]: an open-schema row, a `name → value` mapping over JSON
//!   values. There is no declared schema; mappers and reducers downcast at
//!   their boundaries via the field accessors below.
//! - [`RecordStream`]: a finite, single-pass, lazy sequence of records.
//!   Failures travel in-band as `Err` items and surface at whoever pulls the
//!   terminal stream.
//! - Key extraction and a **total order** over JSON values, shared by the
//!   sort comparator, the adjacency grouper, and the join merge loop.

use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use serde_json::Number;
use std::cmp::Ordering;

pub use serde_json::Value;

/// A single row: an unordered `name → value` mapping with open schema.
pub type Record = serde_json::Map<String, Value>;

/// A finite, single-pass, lazy sequence of records.
pub type RecordStream = Box<dyn Iterator<Item = Result<Record>>>;

/// Build a stream from an in-memory batch of records.
pub fn stream_of(rows: Vec<Record>) -> RecordStream {
    Box::new(rows.into_iter().map(Ok))
}

/// Extract the values of `keys` from a record, in key order.
///
/// A field missing from the record reads as JSON null, which sorts before
/// every other value; key extraction itself never fails.
pub fn key_values(row: &Record, keys: &[String]) -> Vec<Value> {
    keys.iter()
        .map(|k| row.get(k).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Total order over JSON values.
///
/// Values of the same kind compare naturally (numbers as numbers, strings
/// lexicographically, arrays element-wise then by length). Values of
/// different kinds order by kind: null < bool < number < string < array <
/// object. Key fields are assumed mutually comparable; the kind rank only
/// keeps the order total when they are not.
pub fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => cmp_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (u, v) in x.iter().zip(y.iter()) {
                match cmp_values(u, v) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            x.len().cmp(&y.len())
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Lexicographic order over extracted key tuples.
pub fn cmp_keys(a: &[Value], b: &[Value]) -> Ordering {
    for (u, v) in a.iter().zip(b.iter()) {
        match cmp_values(u, v) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn cmp_numbers(x: &Number, y: &Number) -> Ordering {
    if let (Some(i), Some(j)) = (x.as_i64(), y.as_i64()) {
        return i.cmp(&j);
    }
    let x = OrderedFloat(x.as_f64().unwrap_or(f64::NAN));
    let y = OrderedFloat(y.as_f64().unwrap_or(f64::NAN));
    x.cmp(&y)
}

/// Read a field, failing with [`Error::MissingField`] when absent.
pub fn field<'a>(row: &'a Record, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| Error::MissingField(name.to_owned()))
}

/// Read a string column.
pub fn string_field<'a>(row: &'a Record, name: &str) -> Result<&'a str> {
    match field(row, name)? {
        Value::String(s) => Ok(s),
        _ => Err(Error::FieldType {
            field: name.to_owned(),
            expected: "a string",
        }),
    }
}

/// Read a numeric column as `f64`.
pub fn number_field(row: &Record, name: &str) -> Result<f64> {
    match field(row, name)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| Error::FieldType {
            field: name.to_owned(),
            expected: "numeric",
        }),
        _ => Err(Error::FieldType {
            field: name.to_owned(),
            expected: "numeric",
        }),
    }
}
