//! Source operators: the head of every graph.

use crate::error::{Error, Result};
use crate::graph::Inputs;
use crate::record::{Record, RecordStream};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Yields the records of a named run-time input.
///
/// The name is resolved against the [`Inputs`] binding passed to
/// [`Graph::run`](crate::Graph::run); the bound factory is invoked once per
/// run and must return a fresh stream, which is what keeps a graph
/// independently re-runnable.
#[derive(Clone)]
pub struct IterSource {
    name: String,
}

impl IterSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Resolve the name and open a fresh stream.
    ///
    /// # Errors
    /// [`Error::MissingInput`] when no factory was bound under the name.
    pub fn open(&self, inputs: &Inputs) -> Result<RecordStream> {
        debug!(name = %self.name, "opening named input");
        inputs.open(&self.name)
    }
}

/// Parses a text file into records, one line at a time.
///
/// The file is opened lazily when the source is instantiated for a run and
/// read line by line as the consumer pulls; whitespace-only lines are
/// skipped. The parser is a pure `&str → Record` function; the shipped one
/// is [`parse_json_line`](crate::io::jsonl::parse_json_line).
#[derive(Clone)]
pub struct FileSource {
    path: PathBuf,
    parser: Arc<dyn Fn(&str) -> Result<Record> + Send + Sync>,
}

impl FileSource {
    pub fn new(
        path: impl Into<PathBuf>,
        parser: impl Fn(&str) -> Result<Record> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            parser: Arc::new(parser),
        }
    }

    /// Open the file and return the parsed stream.
    ///
    /// # Errors
    /// [`Error::Io`] when the file cannot be opened. Read and parse failures
    /// of individual lines surface as stream items carrying the path and
    /// line number.
    pub fn open(&self) -> Result<RecordStream> {
        debug!(path = %self.path.display(), "opening file source");
        let file = File::open(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(Box::new(FileLines {
            lines: BufReader::new(file).lines(),
            path: self.path.clone(),
            parser: Arc::clone(&self.parser),
            line: 0,
            done: false,
        }))
    }
}

struct FileLines {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    parser: Arc<dyn Fn(&str) -> Result<Record> + Send + Sync>,
    line: usize,
    done: bool,
}

impl Iterator for FileLines {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.line += 1;
            match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(source)) => {
                    self.done = true;
                    return Some(Err(Error::Io {
                        path: self.path.clone(),
                        source,
                    }));
                }
                Some(Ok(text)) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    return match (self.parser)(&text) {
                        Ok(row) => Some(Ok(row)),
                        Err(e) => {
                            self.done = true;
                            Some(Err(Error::ParseLine {
                                path: self.path.clone(),
                                line: self.line,
                                source: Box::new(e),
                            }))
                        }
                    };
                }
            }
        }
    }
}
