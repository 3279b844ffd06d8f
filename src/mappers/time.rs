//! Timestamp mappers.
//!
//! Timestamps are strings of the form `YYYYMMDDTHHMMSS`, optionally carrying
//! a `.ffffff` fraction; both forms parse.

use crate::error::{Error, Result};
use crate::ops::Mapper;
use crate::record::{string_field, Record, Value};
use chrono::{NaiveDateTime, Timelike};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S"))
        .map_err(|_| Error::BadTimestamp {
            field: field.to_owned(),
            value: value.to_owned(),
        })
}

/// Decode a timestamp column into a three-letter weekday abbreviation and
/// an hour-of-day column.
pub struct ParseTimestamp {
    column: String,
    weekday_column: String,
    hour_column: String,
}

impl ParseTimestamp {
    pub fn new(
        column: impl Into<String>,
        weekday_column: impl Into<String>,
        hour_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            weekday_column: weekday_column.into(),
            hour_column: hour_column.into(),
        }
    }
}

impl Mapper for ParseTimestamp {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let stamp = parse_timestamp(&self.column, string_field(&row, &self.column)?)?;
        row.insert(
            self.weekday_column.clone(),
            Value::String(stamp.format("%a").to_string()),
        );
        row.insert(self.hour_column.clone(), Value::from(stamp.hour()));
        Ok(vec![row])
    }
}

/// Absolute difference between two timestamp columns, in hours.
pub struct TimeDiff {
    result_column: String,
    first: String,
    second: String,
}

impl TimeDiff {
    pub fn new(
        result_column: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self {
            result_column: result_column.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

impl Mapper for TimeDiff {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let first = parse_timestamp(&self.first, string_field(&row, &self.first)?)?;
        let second = parse_timestamp(&self.second, string_field(&row, &self.second)?)?;
        let delta = second - first;
        let hours = match delta.num_microseconds() {
            Some(micros) => micros.abs() as f64 / MICROS_PER_HOUR,
            None => delta.num_seconds().abs() as f64 / 3600.0,
        };
        row.insert(self.result_column.clone(), Value::from(hours));
        Ok(vec![row])
    }
}
