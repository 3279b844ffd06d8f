//! Test utilities: record literals and stream assertions.
//!
//! These helpers are shipped (not test-gated) so downstream crates can test
//! their own graphs with them.
//!
//! ```
//! use rowflow::testing::{assert_rows_equal, rows};
//! use serde_json::json;
//!
//! let expected = rows(json!([{"word": "hi", "count": 2}]));
//! assert_rows_equal(&expected, &expected);
//! ```

use crate::record::{Record, Value};

/// Build a record from a `json!` object literal.
///
/// # Panics
/// Panics when the literal is not a JSON object.
pub fn row(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object literal, got: {other}"),
    }
}

/// Build a batch of records from a `json!` array of object literals.
///
/// # Panics
/// Panics when the literal is not an array of objects.
pub fn rows(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items.into_iter().map(row).collect(),
        other => panic!("expected a JSON array literal, got: {other}"),
    }
}

/// Assert two record batches are equal in order and content.
///
/// # Panics
/// Panics with the first differing index and both full batches.
pub fn assert_rows_equal(actual: &[Record], expected: &[Record]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "row count mismatch:\n  expected {} rows: {expected:?}\n  actual {} rows: {actual:?}",
        expected.len(),
        actual.len()
    );
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "row mismatch at index {i}:\n  expected: {e:?}\n  actual:   {a:?}"
        );
    }
}

/// Assert two record batches are equal in order, comparing numeric fields
/// within an absolute tolerance and everything else exactly.
///
/// # Panics
/// Panics with the first differing index, field, and both values.
pub fn assert_rows_close(actual: &[Record], expected: &[Record], tolerance: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "row count mismatch:\n  expected {} rows: {expected:?}\n  actual {} rows: {actual:?}",
        expected.len(),
        actual.len()
    );
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let mut fields: Vec<&String> = a.keys().chain(e.keys()).collect();
        fields.sort();
        fields.dedup();
        for field in fields {
            match (a.get(field), e.get(field)) {
                (Some(Value::Number(x)), Some(Value::Number(y))) => {
                    let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
                    assert!(
                        (x - y).abs() <= tolerance,
                        "row {i}, field `{field}`: {x} is not within {tolerance} of {y}"
                    );
                }
                (Some(x), Some(y)) => assert_eq!(
                    x, y,
                    "row {i}, field `{field}`:\n  expected: {y:?}\n  actual:   {x:?}"
                ),
                (x, y) => panic!(
                    "row {i}, field `{field}` present on one side only:\n  expected: {y:?}\n  actual:   {x:?}"
                ),
            }
        }
    }
}
