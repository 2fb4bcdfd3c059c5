//! Shared: the unit of copy-on-write sharing.
//!
//! Holds the Entry Sequence and the Key Index and keeps them in step. The
//! methods here assume exclusive access; deciding whether to diverge first is
//! the caller's job (see `transaction`).

use crate::entry_list::{EntryList, Position};
use crate::key_index::KeyIndex;
use core::borrow::Borrow;

pub(crate) struct Shared<K, V> {
    pub(crate) entries: EntryList<K, V>,
    pub(crate) index: KeyIndex<K>,
}

// Removes a freshly pushed entry again unless disarmed; keeps the sequence
// and the index consistent if recording the key panics.
struct UnlinkOnUnwind<'a, K, V> {
    entries: &'a mut EntryList<K, V>,
    pos: Option<Position>,
}

impl<'a, K, V> UnlinkOnUnwind<'a, K, V> {
    fn disarm(mut self) {
        self.pos = None;
    }
}

impl<'a, K, V> Drop for UnlinkOnUnwind<'a, K, V> {
    fn drop(&mut self) {
        if let Some(pos) = self.pos.take() {
            self.entries.remove(pos);
        }
    }
}

impl<K: Ord, V> Shared<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: EntryList::new(),
            index: KeyIndex::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn push(&mut self, key: K, value: V)
    where
        K: Clone,
    {
        let index_key = key.clone();
        let pos = self.entries.push_back(key, value);
        let undo = UnlinkOnUnwind {
            entries: &mut self.entries,
            pos: Some(pos),
        };
        self.index.record(index_key, pos);
        undo.disarm();
        debug_assert!(self.index.distinct() <= self.entries.len());
    }

    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        let front = self.entries.front()?;
        let key = self.entries.key(front)?;
        let taken = self.index.take_first(key)?;
        debug_assert_eq!(taken, front, "front entry must head its key's list");
        self.entries.remove(taken)
    }

    pub(crate) fn pop_key<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let pos = self.index.take_first(q)?;
        self.entries.remove(pos)
    }

    /// Splices every entry for `q` to the back, in their current order.
    /// Positions survive the splice, so the index needs no update.
    pub(crate) fn move_key_to_back<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(positions) = self.index.positions(q) else {
            return false;
        };
        for &pos in positions {
            debug_assert!(self.entries.contains(pos));
            self.entries.move_to_back(pos);
        }
        true
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants(&self) {
        use std::collections::HashMap;

        self.entries.debug_validate_invariants();

        let rank: HashMap<Position, usize> = self
            .entries
            .positions()
            .enumerate()
            .map(|(i, p)| (p, i))
            .collect();

        let mut indexed = 0usize;
        for (key, list) in self.index.iter() {
            assert!(!list.is_empty(), "index holds an empty list");
            let mut last_rank = None;
            for &pos in list {
                let r = *rank.get(&pos).expect("index points at a dead entry");
                assert!(
                    self.entries.key(pos) == Some(key),
                    "index position holds a different key"
                );
                assert!(last_rank < Some(r), "index list out of FIFO order");
                last_rank = Some(r);
            }
            indexed += list.len();
        }
        assert_eq!(indexed, self.entries.len(), "entries missing from index");
    }
}

/// Deep copy: replays every entry in order, then rebuilds the index over the
/// new positions. Positions of the source do not carry over.
impl<K: Ord + Clone, V: Clone> Clone for Shared<K, V> {
    fn clone(&self) -> Self {
        let mut entries = EntryList::with_capacity(self.entries.len());
        for (k, v) in self.entries.iter() {
            entries.push_back(k.clone(), v.clone());
        }

        let mut index = KeyIndex::new();
        for pos in entries.positions() {
            if let Some(k) = entries.key(pos) {
                index.record(k.clone(), pos);
            }
        }

        Self { entries, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(s: &Shared<&'static str, i32>) -> Vec<(&'static str, i32)> {
        s.entries.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn push_and_pop_front_keep_index_in_step() {
        let mut s = Shared::new();
        s.push("a", 1);
        s.push("b", 2);
        s.push("a", 3);
        s.debug_validate_invariants();

        assert_eq!(s.pop_front(), Some(("a", 1)));
        assert_eq!(s.index.count("a"), 1);
        assert_eq!(s.pop_front(), Some(("b", 2)));
        assert_eq!(s.index.count("b"), 0);
        s.debug_validate_invariants();
        assert_eq!(s.pop_front(), Some(("a", 3)));
        assert_eq!(s.pop_front(), None);
        assert_eq!(s.index.distinct(), 0);
    }

    #[test]
    fn pop_key_takes_earliest_occurrence() {
        let mut s = Shared::new();
        s.push("a", 1);
        s.push("b", 2);
        s.push("a", 3);
        assert_eq!(s.pop_key("a"), Some(("a", 1)));
        assert_eq!(order(&s), [("b", 2), ("a", 3)]);
        assert_eq!(s.pop_key("z"), None);
        s.debug_validate_invariants();
    }

    /// Invariant: move_key_to_back is a stable partition.
    #[test]
    fn move_key_to_back_is_stable_partition() {
        let mut s = Shared::new();
        s.push("a", 1);
        s.push("b", 2);
        s.push("a", 3);
        s.push("c", 4);
        assert!(s.move_key_to_back("a"));
        assert_eq!(order(&s), [("b", 2), ("c", 4), ("a", 1), ("a", 3)]);
        assert!(!s.move_key_to_back("z"));
        s.debug_validate_invariants();
    }

    /// Invariant: the copy is structurally independent and satisfies both
    /// invariants on its own positions.
    #[test]
    fn clone_rebuilds_index_over_new_positions() {
        let mut s = Shared::new();
        s.push("x", 1);
        s.push("y", 2);
        s.push("x", 3);
        s.move_key_to_back("x");

        let mut c = s.clone();
        c.debug_validate_invariants();
        assert_eq!(order(&c), order(&s));

        c.pop_key("x");
        assert_eq!(s.index.count("x"), 2);
        assert_eq!(c.index.count("x"), 1);
        s.debug_validate_invariants();
    }

    /// Invariant: a panic while indexing a pushed key leaves no trace of the entry.
    #[test]
    fn push_unlinks_entry_when_indexing_panics() {
        use core::cmp::Ordering;

        #[derive(Clone, Debug)]
        struct Touchy(u32);
        impl PartialEq for Touchy {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }
        impl Eq for Touchy {}
        impl PartialOrd for Touchy {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Touchy {
            fn cmp(&self, other: &Self) -> Ordering {
                if self.0 == 99 || other.0 == 99 {
                    panic!("refusing to compare 99");
                }
                self.0.cmp(&other.0)
            }
        }

        let mut s = Shared::new();
        s.push(Touchy(1), "one");
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            s.push(Touchy(99), "bad");
        }));
        assert!(res.is_err());
        assert_eq!(s.len(), 1);
        assert_eq!(s.index.distinct(), 1);
        s.debug_validate_invariants();
    }
}
