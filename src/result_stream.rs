use std::fmt;
use std::mem;

use tracing::{debug, error, trace};

use crate::{
    cursor::Cursor,
    error::{Error, Result},
    lending_iterator::LendingIterator,
    producer::Producer,
};

/// Marker a [`Cursor`] compares equal to once its stream is drained.
///
/// It carries no state and is never dereferenced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct End;

/// A lazy, single-pass stream over the results of a [`Producer`].
///
/// The stream owns its producer exclusively and pulls from it only when asked to
/// advance. The most recently pulled result is cached, so reading it repeatedly is
/// free and has no side effects. The type is move-only: duplicating it would
/// duplicate the producer.
///
/// Obtaining a [`Cursor`] primes it: the first result is pulled right away, so
/// `stream.cursor()?.get()` already returns the first result.
///
/// ```
/// use result_stream::{producer, End, ResultStream};
///
/// let mut stream = ResultStream::new(producer::from_iter([5, 7, 2]));
/// let mut cursor = stream.cursor()?;
/// assert_eq!(cursor.get(), Some(&5));
/// assert!(cursor.advance()?);
/// assert_eq!(cursor.get(), Some(&7));
/// assert!(cursor.advance()?);
/// assert_eq!(cursor.get(), Some(&2));
/// assert!(!cursor.advance()?);
/// assert!(cursor == End);
/// # Ok::<(), result_stream::Error>(())
/// ```
pub struct ResultStream<P: Producer> {
    producer: Option<Box<P>>,
    cache: Option<P::Output>,
}

impl<P: Producer> ResultStream<P> {
    /// Takes ownership of `producer`. Nothing is pulled until the stream is advanced.
    pub fn new(producer: P) -> ResultStream<P> {
        ResultStream {
            producer: Some(Box::new(producer)),
            cache: None,
        }
    }

    /// A stream without a producer. Advancing it fails with [`Error::NoProducer`].
    pub fn empty() -> ResultStream<P> {
        ResultStream {
            producer: None,
            cache: None,
        }
    }

    pub fn has_producer(&self) -> bool {
        self.producer.is_some()
    }

    /// Pulls the next result from the producer into the cache.
    ///
    /// Returns `Ok(false)` once the producer is drained, in which case the cache keeps
    /// its last (now stale) value.
    ///
    /// # Errors
    ///
    /// [`Error::NoProducer`] if the stream does not own a producer.
    pub fn advance(&mut self) -> Result<bool> {
        let Some(producer) = self.producer.as_mut() else {
            error!("advance called on a stream without a producer");
            return Err(Error::NoProducer);
        };

        match producer.pull_next() {
            Some(result) => {
                trace!("pulled next result");
                self.cache = Some(result);
                Ok(true)
            }
            None => {
                debug!("producer exhausted");
                Ok(false)
            }
        }
    }

    /// Returns a primed cursor over this stream; see [`Cursor`].
    pub fn cursor(&mut self) -> Result<Cursor<'_, P>> {
        Cursor::new(self)
    }

    pub fn end(&self) -> End {
        End
    }

    /// The most recently pulled result, regardless of whether the producer has since
    /// been drained. `None` before the first successful pull.
    pub fn cached(&self) -> Option<&P::Output> {
        self.cache.as_ref()
    }

    /// Moves the producer and the cached result into a new stream, leaving `self` empty.
    pub fn take(&mut self) -> ResultStream<P> {
        mem::take(self)
    }

    /// Gives the producer back, dropping the cached result.
    pub fn into_producer(self) -> Option<P> {
        self.producer.map(|producer| *producer)
    }
}

impl<P: Producer> Default for ResultStream<P> {
    fn default() -> ResultStream<P> {
        ResultStream::empty()
    }
}

impl<P: Producer> From<P> for ResultStream<P> {
    fn from(producer: P) -> ResultStream<P> {
        ResultStream::new(producer)
    }
}

impl<P: Producer> fmt::Debug for ResultStream<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStream")
            .field("has_producer", &self.has_producer())
            .field("has_cached", &self.cache.is_some())
            .finish()
    }
}

// Lends a reference into the cache. An empty stream lends `Err(NoProducer)` on every
// call, so loops should bail out on the first error.
impl<P: Producer> LendingIterator for ResultStream<P> {
    type Item<'a> = Result<&'a P::Output>
    where
        Self: 'a;

    fn next<'a>(&'a mut self) -> Option<Self::Item<'a>> {
        match self.advance() {
            Err(err) => Some(Err(err)),
            Ok(true) => self.cache.as_ref().map(Ok),
            Ok(false) => None,
        }
    }
}

/// Owning iterator over a stream, yielding each result by value.
pub struct IntoIter<P: Producer> {
    stream: ResultStream<P>,
    failed: bool,
}

impl<P: Producer> Iterator for IntoIter<P> {
    type Item = Result<P::Output>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.stream.advance() {
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
            Ok(true) => self.stream.cache.take().map(Ok),
            Ok(false) => None,
        }
    }
}

impl<P: Producer> IntoIterator for ResultStream<P> {
    type Item = Result<P::Output>;
    type IntoIter = IntoIter<P>;

    fn into_iter(self) -> IntoIter<P> {
        IntoIter {
            stream: self,
            failed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use proptest::prelude::*;

    use super::*;
    use crate::{producer, test_support::init_tracing};

    struct DropFlag {
        dropped: Rc<Cell<bool>>,
    }

    impl Producer for DropFlag {
        type Output = ();

        fn pull_next(&mut self) -> Option<()> {
            None
        }
    }

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    #[test]
    fn construction_does_not_pull() {
        let pulls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&pulls);
        let stream = ResultStream::new(producer::from_fn(move || {
            counter.set(counter.get() + 1);
            Some(counter.get())
        }));
        assert!(stream.has_producer());
        assert_eq!(stream.cached(), None);
        assert_eq!(pulls.get(), 0);
    }

    #[test]
    fn advance_caches_latest_result() {
        init_tracing();
        let mut stream = ResultStream::new(producer::from_iter(vec![5, 7, 2]));
        assert_eq!(stream.advance(), Ok(true));
        assert_eq!(stream.cached(), Some(&5));
        assert_eq!(stream.cached(), Some(&5));
        assert_eq!(stream.advance(), Ok(true));
        assert_eq!(stream.cached(), Some(&7));
        assert_eq!(stream.advance(), Ok(true));
        assert_eq!(stream.cached(), Some(&2));
        assert_eq!(stream.advance(), Ok(false));
        // The stale value stays behind.
        assert_eq!(stream.cached(), Some(&2));
        assert_eq!(stream.advance(), Ok(false));
    }

    #[test]
    fn empty_stream_always_fails() {
        init_tracing();
        let mut stream: ResultStream<producer::FromIter<std::vec::IntoIter<u8>>> =
            ResultStream::default();
        assert!(!stream.has_producer());
        for _ in 0..3 {
            assert_eq!(stream.advance(), Err(Error::NoProducer));
        }
        assert_eq!(stream.cursor().err(), Some(Error::NoProducer));
    }

    #[test]
    fn take_transfers_ownership() {
        let mut a = ResultStream::new(producer::from_iter([1, 2, 3]));
        assert_eq!(a.advance(), Ok(true));

        let mut b = a.take();
        assert!(!a.has_producer());
        assert_eq!(a.cached(), None);
        assert_eq!(a.advance(), Err(Error::NoProducer));

        assert_eq!(b.cached(), Some(&1));
        assert_eq!(b.advance(), Ok(true));
        assert_eq!(b.cached(), Some(&2));
        assert_eq!(b.advance(), Ok(true));
        assert_eq!(b.cached(), Some(&3));
        assert_eq!(b.advance(), Ok(false));
    }

    #[test]
    fn move_keeps_position() {
        let mut a = ResultStream::new(producer::from_iter(["x", "y"]));
        assert_eq!(a.advance(), Ok(true));
        let mut b = a;
        assert_eq!(b.cached(), Some(&"x"));
        assert_eq!(b.advance(), Ok(true));
        assert_eq!(b.cached(), Some(&"y"));
    }

    #[test]
    fn dropping_stream_drops_producer() {
        let dropped = Rc::new(Cell::new(false));
        let stream = ResultStream::new(DropFlag {
            dropped: Rc::clone(&dropped),
        });
        assert!(!dropped.get());
        drop(stream);
        assert!(dropped.get());
    }

    #[test]
    fn into_producer_releases_producer() {
        let dropped = Rc::new(Cell::new(false));
        let stream = ResultStream::new(DropFlag {
            dropped: Rc::clone(&dropped),
        });
        let producer = stream.into_producer();
        assert!(producer.is_some());
        assert!(!dropped.get());
        drop(producer);
        assert!(dropped.get());
    }

    #[test]
    fn into_iter_yields_owned_results() {
        let stream = ResultStream::new(producer::from_iter(vec![
            String::from("a"),
            String::from("b"),
        ]));
        let results: Result<Vec<String>> = stream.into_iter().collect();
        assert_eq!(results, Ok(vec![String::from("a"), String::from("b")]));
    }

    #[test]
    fn into_iter_on_empty_stream_fails_once() {
        let stream: ResultStream<producer::FromIter<std::ops::Range<u32>>> = ResultStream::empty();
        let mut it = stream.into_iter();
        assert_eq!(it.next(), Some(Err(Error::NoProducer)));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn lending_iterator_borrows_cache() {
        let mut stream = ResultStream::new(producer::from_iter(1..=4));
        let mut sum = 0;
        while let Some(result) = stream.next() {
            let value = result.expect("stream has a producer");
            sum += *value;
        }
        assert_eq!(sum, 10);
        assert_eq!(stream.cached(), Some(&4));
    }

    #[test]
    fn producer_errors_pass_through() {
        let mut stream = ResultStream::new(producer::from_iter(vec![Ok(1), Err("bad pair"), Ok(3)]));
        let mut cursor = stream.cursor().expect("stream has a producer");
        assert_eq!(cursor.get(), Some(&Ok(1)));
        assert_eq!(cursor.advance(), Ok(true));
        assert_eq!(cursor.get(), Some(&Err("bad pair")));
        assert_eq!(cursor.advance(), Ok(true));
        assert_eq!(cursor.get(), Some(&Ok(3)));
    }

    proptest! {
        #[test]
        fn nth_advance_caches_nth_result(values in proptest::collection::vec(any::<i64>(), 0..64)) {
            let mut stream = ResultStream::new(producer::from_iter(values.clone()));
            for value in &values {
                prop_assert_eq!(stream.advance(), Ok(true));
                prop_assert_eq!(stream.cached(), Some(value));
            }
            for _ in 0..3 {
                prop_assert_eq!(stream.advance(), Ok(false));
            }
        }

        #[test]
        fn no_producer_is_deterministic(calls in 1usize..32) {
            let mut stream: ResultStream<producer::FromIter<std::vec::IntoIter<i64>>> =
                ResultStream::empty();
            for _ in 0..calls {
                prop_assert_eq!(stream.advance(), Err(Error::NoProducer));
            }
        }
    }
}
