use std::result;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `advance` was called on a stream that never took ownership of a producer,
    /// or whose producer has been moved out.
    #[error("no producer available to pull results from")]
    NoProducer,
}

pub type Result<T> = result::Result<T, Error>;
