//! Read-only iterator over the distinct keys of a `KvFifo`.

use crate::entry_list::Position;
use std::collections::btree_map;
use std::collections::VecDeque;

/// Distinct keys in ascending order. Walkable from both ends.
///
/// Borrows the queue it came from, so it cannot outlive the next mutation;
/// call `KvFifo::keys` again for a fresh view.
pub struct Keys<'a, K> {
    inner: btree_map::Keys<'a, K, VecDeque<Position>>,
}

impl<'a, K> Keys<'a, K> {
    pub(crate) fn new(inner: btree_map::Keys<'a, K, VecDeque<Position>>) -> Self {
        Self { inner }
    }
}

impl<'a, K> Clone for Keys<'a, K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K> DoubleEndedIterator for Keys<'a, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<'a, K> ExactSizeIterator for Keys<'a, K> {}

impl<'a, K> core::iter::FusedIterator for Keys<'a, K> {}

impl<'a, K: core::fmt::Debug> core::fmt::Debug for Keys<'a, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
