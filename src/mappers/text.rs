//! Text-normalization mappers used by the tokenizing pipelines.

use crate::error::Result;
use crate::ops::Mapper;
use crate::record::{string_field, Record, Value};
use regex::Regex;

/// ASCII punctuation removed by [`StripPunctuation`].
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Drop ASCII punctuation characters from a string column.
pub struct StripPunctuation {
    column: String,
}

impl StripPunctuation {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for StripPunctuation {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let cleaned: String = string_field(&row, &self.column)?
            .chars()
            .filter(|c| !PUNCTUATION.contains(*c))
            .collect();
        row.insert(self.column.clone(), Value::String(cleaned));
        Ok(vec![row])
    }
}

/// Lowercase a string column in place.
pub struct Lowercase {
    column: String,
}

impl Lowercase {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for Lowercase {
    fn map(&self, mut row: Record) -> Result<Vec<Record>> {
        let lowered = string_field(&row, &self.column)?.to_lowercase();
        row.insert(self.column.clone(), Value::String(lowered));
        Ok(vec![row])
    }
}

/// Split a string column into tokens, emitting one record per token.
///
/// Every output record is a copy of the input with the column replaced by a
/// single token. When the column yields no tokens at all, a single record
/// with the empty token is emitted, so a row never silently disappears.
pub struct Split {
    column: String,
    pattern: Regex,
}

impl Split {
    /// Split on runs of whitespace.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            pattern: Regex::new(r"\S+").expect("static pattern"),
        }
    }

    /// Split on any character of `separator` (treated as a set, not a
    /// sequence).
    pub fn on(column: impl Into<String>, separator: &str) -> Self {
        let class = format!("[^{}]+", regex::escape(separator));
        Self {
            column: column.into(),
            pattern: Regex::new(&class).expect("escaped character class"),
        }
    }
}

impl Mapper for Split {
    fn map(&self, row: Record) -> Result<Vec<Record>> {
        let text = string_field(&row, &self.column)?.to_owned();
        let mut out = Vec::new();
        for token in self.pattern.find_iter(&text) {
            let mut copy = row.clone();
            copy.insert(
                self.column.clone(),
                Value::String(token.as_str().to_owned()),
            );
            out.push(copy);
        }
        if out.is_empty() {
            let mut empty = row;
            empty.insert(self.column.clone(), Value::String(String::new()));
            out.push(empty);
        }
        Ok(out)
    }
}
