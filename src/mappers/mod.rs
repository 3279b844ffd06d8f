//! The shipped mapper library.
//!
//! Mappers are small strategy objects configured with column names; each one
//! implements [`Mapper`](crate::Mapper) over the open record schema and
//! downcasts the fields it touches at its own boundary.

mod columns;
mod geo;
mod text;
mod time;

pub use columns::{Filter, Identity, LogRatio, Product, Project};
pub use geo::HaversineDistance;
pub use text::{Lowercase, Split, StripPunctuation};
pub use time::{ParseTimestamp, TimeDiff};
