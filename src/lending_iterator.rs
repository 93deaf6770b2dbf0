pub trait LendingIterator {
    // GAT: the item may borrow from `Self`, e.g. a reference into a cached result
    type Item<'a>
    where
        Self: 'a;

    // Same shape as `Iterator::next`, except the item lives only until the next call
    fn next<'a>(&'a mut self) -> Option<Self::Item<'a>>;
}
