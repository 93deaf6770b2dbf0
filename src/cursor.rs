use std::fmt;

use tracing::debug;

use crate::{
    error::Result,
    producer::Producer,
    result_stream::{End, ResultStream},
};

/// Forward cursor over a [`ResultStream`].
///
/// A cursor is created primed: constructing it pulls the first result, so
/// [`get`](Cursor::get) returns it without an extra advance. If the producer had
/// nothing to give, the cursor already equals [`End`].
///
/// The cursor mutably borrows its stream, so at most one cursor drives a stream at a
/// time and none can outlive it. Once a cursor has reached [`End`] it stays there.
pub struct Cursor<'a, P: Producer> {
    stream: &'a mut ResultStream<P>,
    exhausted: bool,
}

impl<'a, P: Producer> Cursor<'a, P> {
    pub(crate) fn new(stream: &'a mut ResultStream<P>) -> Result<Cursor<'a, P>> {
        let mut cursor = Cursor {
            stream,
            exhausted: false,
        };
        if !cursor.advance()? {
            debug!("cursor primed on an exhausted stream");
        }
        Ok(cursor)
    }

    /// The current result, or `None` once the cursor is exhausted.
    pub fn get(&self) -> Option<&P::Output> {
        if self.exhausted {
            return None;
        }
        self.stream.cached()
    }

    /// Pulls the next result. Returns `Ok(false)` when the stream is drained, after
    /// which the cursor compares equal to [`End`].
    pub fn advance(&mut self) -> Result<bool> {
        let pulled = self.stream.advance()?;
        self.exhausted |= !pulled;
        Ok(!self.exhausted)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<P: Producer> PartialEq<End> for Cursor<'_, P> {
    fn eq(&self, _end: &End) -> bool {
        self.exhausted
    }
}

impl<P: Producer> PartialEq<Cursor<'_, P>> for End {
    fn eq(&self, cursor: &Cursor<'_, P>) -> bool {
        cursor == self
    }
}

impl<P: Producer> fmt::Debug for Cursor<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
