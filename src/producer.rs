//! Producers are the engines a [`ResultStream`](crate::ResultStream) pulls from.
//!
//! A producer hands out one result per [`Producer::pull_next`] call and returns `None`
//! once it is drained. Exhaustion is permanent: every call after the first `None` must
//! return `None` again. How the producer gets its results (computing them on the spot,
//! draining a buffer filled by worker threads, ...) is its own business.

use std::iter::Fuse;

// Number of results a `Batched` producer reserves room for per refill.
pub const DEFAULT_BATCH_CAPACITY: usize = 64;

pub trait Producer {
    type Output;

    fn pull_next(&mut self) -> Option<Self::Output>;
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    type Output = P::Output;

    fn pull_next(&mut self) -> Option<Self::Output> {
        (**self).pull_next()
    }
}

/// Producer over any iterator. The iterator is fused, so a misbehaving iterator
/// that resumes after returning `None` still looks exhausted.
pub struct FromIter<I: Iterator> {
    it: Fuse<I>,
}

pub fn from_iter<I: IntoIterator>(iterable: I) -> FromIter<I::IntoIter> {
    FromIter {
        it: iterable.into_iter().fuse(),
    }
}

impl<I: Iterator> Producer for FromIter<I> {
    type Output = I::Item;

    fn pull_next(&mut self) -> Option<Self::Output> {
        self.it.next()
    }
}

/// Producer over a closure. The closure is not called again once it has returned `None`.
pub struct FromFn<F> {
    f: F,
    done: bool,
}

pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnMut() -> Option<T>,
{
    FromFn { f, done: false }
}

impl<T, F> Producer for FromFn<F>
where
    F: FnMut() -> Option<T>,
{
    type Output = T;

    fn pull_next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let next = (self.f)();
        self.done = next.is_none();
        next
    }
}

/// Producer for engines that compute results a batch at a time.
///
/// Whenever the internal buffer runs dry the `refill` closure is called with the (empty)
/// buffer. It appends the next batch and returns `false` once the engine has nothing left
/// after this batch. Results are handed out in the order they were appended.
pub struct Batched<F, T> {
    refill: F,
    // Holds the current batch in reverse so `pop` yields FIFO order.
    buffer: Vec<T>,
    done: bool,
}

impl<F, T> Batched<F, T>
where
    F: FnMut(&mut Vec<T>) -> bool,
{
    pub fn new(refill: F) -> Batched<F, T> {
        Batched::with_capacity(DEFAULT_BATCH_CAPACITY, refill)
    }

    pub fn with_capacity(capacity: usize, refill: F) -> Batched<F, T> {
        Batched {
            refill,
            buffer: Vec::with_capacity(capacity),
            done: false,
        }
    }

    /// Results already computed but not pulled yet.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn fill(&mut self) {
        let more = (self.refill)(&mut self.buffer);
        // An empty batch can't be told apart from a stalled engine, treat it as the end.
        self.done = !more || self.buffer.is_empty();
        self.buffer.reverse();
    }
}

impl<F, T> Producer for Batched<F, T>
where
    F: FnMut(&mut Vec<T>) -> bool,
{
    type Output = T;

    fn pull_next(&mut self) -> Option<T> {
        if self.buffer.is_empty() {
            if self.done {
                return None;
            }
            self.fill();
        }
        self.buffer.pop()
    }
}
