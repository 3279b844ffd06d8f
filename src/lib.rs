//! # Rowflow
//!
//! A **computational-graph dataflow engine** for MapReduce-style batch
//! processing of record streams. A graph is built by chaining
//! record-oriented operators -- map, reduce, sort, join -- against one or more
//! named input sources, then executed against concrete data to yield an
//! output stream.
//!
//! ## Key features
//!
//! - **Open-schema records** -- rows are `name → value` maps over JSON
//!   values; mappers and reducers downcast at their own boundaries
//! - **Lazy, single-pass streams** -- records flow one at a time, pulled by
//!   the consumer; failures travel in-band
//! - **Copy-on-append graphs** -- building is side-effect-free, every graph
//!   is independently re-runnable
//! - **External sort** -- per-group sorting delegated to a sibling worker
//!   over a framed channel, keeping run buffers out of the driver
//! - **Sort-merge joins** -- inner/left/right/outer strategies with
//!   suffix-on-collision schema merging and a runtime sortedness check
//! - **Shipped pipelines** -- word count, TF-IDF, PMI, and mean-speed graph
//!   constructors, plus CLI tools wrapping them
//!
//! ## Quick start
//!
//! ```
//! use rowflow::algorithms::word_count_graph;
//! use rowflow::testing::rows;
//! use rowflow::{Graph, Inputs};
//! use serde_json::json;
//!
//! # fn main() -> rowflow::Result<()> {
//! let graph = word_count_graph(Graph::from_input("texts"), "text", "count");
//!
//! let inputs = Inputs::new().rows(
//!     "texts",
//!     rows(json!([
//!         {"doc_id": 1, "text": "to be or not to be"},
//!     ])),
//! );
//!
//! let counts = graph.run(&inputs)?.collect::<rowflow::Result<Vec<_>>>()?;
//! assert_eq!(counts.len(), 4); // be, not, or, to
//! # Ok(())
//! # }
//! ```
//!
//! ## Core concepts
//!
//! ### `Record` and `RecordStream`
//!
//! A [`Record`] is an unordered field map with no declared schema. A
//! [`RecordStream`] is a finite, single-pass, lazy iterator of records;
//! pulling it drives the whole chain, and dropping it tears the chain down
//! (including any live sort worker).
//!
//! ### Operators and strategies
//!
//! Operators own the streaming mechanics; the per-record work is delegated
//! to strategy objects you can implement yourself: [`Mapper`] (record →
//! batch), [`Reducer`] (group → batch), and [`Joiner`] (pair of key-equal
//! groups → batch). The [`mappers`] and [`reducers`] modules ship the
//! standard library of strategies.
//!
//! ### Graphs
//!
//! A [`Graph`] is pure data: an operator chain plus the side-graphs its
//! join steps consume. Builder methods return new graphs; nothing mutates.
//! [`Graph::run`] binds the graph to an [`Inputs`] mapping of named stream
//! factories and returns the terminal stream.
//!
//! ## Execution model
//!
//! Execution is single-threaded cooperative streaming: there is no
//! scheduler, records move only when the consumer pulls. The one sibling
//! unit of work is the external sort worker, which receives a run of
//! records over a channel, sorts, and echoes them back (see
//! [`ops::ExternalSort`]). Errors are fatal to the run and surface at the
//! consumer; partial output already emitted is the consumer's to keep or
//! discard.

pub mod algorithms;
pub mod error;
pub mod graph;
pub mod io;
pub mod mappers;
pub mod ops;
pub mod record;
pub mod reducers;
pub mod testing;

pub use error::{Error, Result};
pub use graph::{Graph, Inputs};
pub use ops::{
    ExternalSort, FileSource, InnerJoiner, IterSource, Join, JoinState, Joiner, LeftJoiner, Map,
    Mapper, OuterJoiner, Reduce, Reducer, RightJoiner, SortSpec,
};
pub use record::{Record, RecordStream, Value};
