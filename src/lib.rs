//! Lazy, single-pass streams over the results of a pairwise-computation engine.
//!
//! A [`ResultStream`] owns a [`Producer`] and pulls one result at a time from it,
//! caching the latest. Iterate it with a [`Cursor`] (compared against [`End`]),
//! with the borrowing [`LendingIterator`], or by value through `IntoIterator`.

pub mod cursor;
pub mod error;
pub mod lending_iterator;
pub mod producer;
pub mod result_stream;

pub use cursor::Cursor;
pub use error::{Error, Result};
pub use lending_iterator::LendingIterator;
pub use producer::Producer;
pub use result_stream::{End, IntoIter, ResultStream};
