//! Line-delimited JSON input and JSON-array output.

use crate::error::{Error, Result};
use crate::record::Record;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// The shipped line parser: one JSON object per line.
///
/// # Errors
/// Fails when the line is not a JSON object.
pub fn parse_json_line(line: &str) -> Result<Record> {
    Ok(serde_json::from_str(line)?)
}

/// Write a slice as a single JSON array, creating parent directories as
/// needed.
///
/// This is the output format of the shipped CLI tools: the terminal record
/// stream, collected and serialized in one document.
///
/// # Returns
/// The number of items written.
///
/// # Errors
/// Fails when the file cannot be created or an item fails to serialize.
pub fn write_json_array<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, rows)?;
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(rows.len())
}
