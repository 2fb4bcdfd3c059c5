//! KeyIndex: sorted map from key to the positions holding it, in FIFO order.
//!
//! Every key present maps to a non-empty list; a key whose last position is
//! taken is erased from the map. A panicking `Ord` leaves the index
//! untouched: `BTreeMap` compares before it restructures.

use crate::entry_list::Position;
use core::borrow::Borrow;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::VecDeque;

pub(crate) struct KeyIndex<K> {
    map: BTreeMap<K, VecDeque<Position>>,
}

impl<K: Ord> KeyIndex<K> {
    pub(crate) fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Number of distinct keys.
    pub(crate) fn distinct(&self) -> usize {
        self.map.len()
    }

    /// Appends `pos` to the list for `key`, creating the list if absent.
    pub(crate) fn record(&mut self, key: K, pos: Position) {
        self.map.entry(key).or_default().push_back(pos);
    }

    /// Removes and returns the earliest position recorded for `q`.
    pub(crate) fn take_first<Q>(&mut self, q: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.map.get(q)?.len() == 1 {
            return self.map.remove(q)?.pop_front();
        }
        self.map.get_mut(q)?.pop_front()
    }

    pub(crate) fn first<Q>(&self, q: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get(q)?.front().copied()
    }

    pub(crate) fn last<Q>(&self, q: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get(q)?.back().copied()
    }

    pub(crate) fn positions<Q>(&self, q: &Q) -> Option<&VecDeque<Position>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get(q)
    }

    pub(crate) fn count<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get(q).map_or(0, VecDeque::len)
    }

    pub(crate) fn keys(&self) -> btree_map::Keys<'_, K, VecDeque<Position>> {
        self.map.keys()
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn iter(&self) -> btree_map::Iter<'_, K, VecDeque<Position>> {
        self.map.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }
}
