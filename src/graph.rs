//! Graph values: immutable operator chains and their execution.
//!
//! A [`Graph`] is pure data -- an ordered list of operator descriptors plus a
//! parallel list of side-graphs consumed, in order, by the join steps.
//! Builder methods are copy-on-append: each one returns a fresh graph that
//! shares no mutable state with its predecessor (strategy objects are shared
//! behind `Arc`, which is safe because they are stateless). Building has no
//! side effects; [`Graph::run`] binds the graph to concrete input factories
//! and wires up a fresh operator chain, so every run starts from scratch and
//! any number of runs may be taken from the same graph.

use crate::error::{Error, Result};
use crate::ops::{
    ExternalSort, FileSource, IterSource, Join, Joiner, Map, Mapper, Reduce, Reducer, SortSpec,
};
use crate::record::{stream_of, Record, RecordStream};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Named input bindings for [`Graph::run`].
///
/// Each name maps to a zero-argument factory that must produce a *fresh*
/// stream per call; that is what lets the same binding serve any number of
/// runs.
#[derive(Default)]
pub struct Inputs {
    factories: HashMap<String, Box<dyn Fn() -> RecordStream>>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to an in-memory batch; each run reads a fresh copy.
    pub fn rows(self, name: impl Into<String>, rows: Vec<Record>) -> Self {
        self.factory(name, move || stream_of(rows.clone()))
    }

    /// Bind `name` to a stream factory.
    pub fn factory(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> RecordStream + 'static,
    ) -> Self {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub(crate) fn open(&self, name: &str) -> Result<RecordStream> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(Error::MissingInput(name.to_owned())),
        }
    }
}

#[derive(Clone)]
enum Step {
    FromInput(IterSource),
    FromFile(FileSource),
    Map(Map),
    Reduce(Reduce),
    Sort(ExternalSort),
    Join(Join),
}

/// An immutable chain of operators rooted at a source.
#[derive(Clone)]
pub struct Graph {
    steps: Vec<Step>,
    side_graphs: Vec<Graph>,
}

impl Graph {
    /// A graph reading from the named run-time input.
    pub fn from_input(name: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::FromInput(IterSource::new(name))],
            side_graphs: Vec::new(),
        }
    }

    /// A graph reading a text file through a line parser.
    pub fn from_file(
        path: impl Into<PathBuf>,
        parser: impl Fn(&str) -> Result<Record> + Send + Sync + 'static,
    ) -> Self {
        Self {
            steps: vec![Step::FromFile(FileSource::new(path, parser))],
            side_graphs: Vec::new(),
        }
    }

    /// Extend with a map step.
    pub fn map(&self, mapper: impl Mapper + 'static) -> Self {
        self.push(Step::Map(Map::new(mapper)))
    }

    /// Extend with a reduce step grouping on `keys`.
    pub fn reduce(&self, reducer: impl Reducer + 'static, keys: &[&str]) -> Self {
        self.push(Step::Reduce(Reduce::new(reducer, keys)))
    }

    /// Extend with an ascending sort on `keys`.
    pub fn sort(&self, keys: &[&str]) -> Self {
        self.sort_with(SortSpec::by(keys))
    }

    /// Extend with a fully configured sort.
    pub fn sort_with(&self, spec: SortSpec) -> Self {
        self.push(Step::Sort(ExternalSort::new(spec)))
    }

    /// Extend with a join against another graph on `keys`.
    ///
    /// The side graph is evaluated afresh -- against the same inputs -- every
    /// time this graph runs.
    pub fn join(&self, joiner: impl Joiner + 'static, side: &Graph, keys: &[&str]) -> Self {
        let mut next = self.push(Step::Join(Join::new(joiner, keys)));
        next.side_graphs.push(side.clone());
        next
    }

    fn push(&self, step: Step) -> Self {
        let mut next = self.clone();
        next.steps.push(step);
        next
    }

    /// Materialize the graph against concrete inputs.
    ///
    /// Returns the lazy terminal stream; nothing is pulled yet. Each call
    /// wires up a fresh operator chain (and fresh runs of every side-graph),
    /// so runs are independent.
    ///
    /// # Errors
    /// [`Error::MissingInput`] when a source name has no binding and
    /// [`Error::Io`] when a file source cannot be opened; everything else
    /// surfaces through the stream.
    pub fn run(&self, inputs: &Inputs) -> Result<RecordStream> {
        debug!(
            steps = self.steps.len(),
            side_graphs = self.side_graphs.len(),
            "wiring graph"
        );
        let mut steps = self.steps.iter();
        let mut stream = match steps.next() {
            Some(Step::FromInput(source)) => source.open(inputs)?,
            Some(Step::FromFile(source)) => source.open()?,
            _ => unreachable!("graphs always begin with a source"),
        };
        let mut side_graphs = self.side_graphs.iter();
        for step in steps {
            stream = match step {
                Step::Map(op) => op.apply(stream),
                Step::Reduce(op) => op.apply(stream),
                Step::Sort(op) => op.apply(stream),
                Step::Join(op) => {
                    let side = side_graphs.next().ok_or(Error::WrongJoinArgument)?;
                    op.apply(stream, side.run(inputs)?)
                }
                Step::FromInput(_) | Step::FromFile(_) => {
                    unreachable!("sources only appear at the head")
                }
            };
        }
        Ok(stream)
    }
}
