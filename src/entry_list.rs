//! EntryList: FIFO sequence of `(key, value)` entries with stable positions.
//!
//! Nodes live in a `SlotMap` and are doubly linked by their slot keys, so a
//! `Position` stays valid across unrelated pushes, removals and moves.
//! Removing an entry invalidates its position; a later push never aliases it
//! because slot keys are generational.
//!
//! - `push_back`: O(1)
//! - `remove(pos)`: O(1)
//! - `move_to_back(pos)`: O(1)
//! - `front` / `back`: O(1)

use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one entry of an `EntryList`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position(DefaultKey);

impl Position {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Position(k)
    }
    pub(crate) fn raw_key(&self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub struct EntryList<K, V> {
    slots: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> Default for EntryList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EntryList<K, V> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.slots.contains_key(pos.raw_key())
    }

    pub fn front(&self) -> Option<Position> {
        self.head.map(Position::new)
    }

    pub fn back(&self) -> Option<Position> {
        self.tail.map(Position::new)
    }

    pub fn get(&self, pos: Position) -> Option<(&K, &V)> {
        self.slots.get(pos.raw_key()).map(|n| (&n.key, &n.value))
    }

    /// Keys are never handed out mutably; only the value may change in place.
    pub fn get_mut(&mut self, pos: Position) -> Option<(&K, &mut V)> {
        self.slots
            .get_mut(pos.raw_key())
            .map(|n| (&n.key, &mut n.value))
    }

    pub fn key(&self, pos: Position) -> Option<&K> {
        self.slots.get(pos.raw_key()).map(|n| &n.key)
    }

    /// Appends an entry and returns its position.
    pub fn push_back(&mut self, key: K, value: V) -> Position {
        let k = self.slots.insert(Node {
            key,
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(tail) => {
                if let Some(node) = self.slots.get_mut(tail) {
                    node.next = Some(k);
                }
            }
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        Position::new(k)
    }

    /// Unlinks and returns the entry at `pos`; `None` if `pos` is stale.
    pub fn remove(&mut self, pos: Position) -> Option<(K, V)> {
        let k = pos.raw_key();
        self.detach(k)?;
        self.slots.remove(k).map(|n| (n.key, n.value))
    }

    /// Splices the entry at `pos` to the back; returns `false` if `pos` is stale.
    pub fn move_to_back(&mut self, pos: Position) -> bool {
        let k = pos.raw_key();
        if !self.slots.contains_key(k) {
            return false;
        }
        if self.tail == Some(k) {
            return true;
        }
        self.detach(k);
        self.attach_back(k);
        true
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    /// Entries from front to back.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Positions from front to back.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let mut cur = self.head;
        core::iter::from_fn(move || {
            let k = cur?;
            cur = self.slots.get(k).and_then(|n| n.next);
            Some(Position::new(k))
        })
    }

    fn detach(&mut self, k: DefaultKey) -> Option<()> {
        let (prev, next) = {
            let node = self.slots.get(k)?;
            (node.prev, node.next)
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.slots.get_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.slots.get_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slots.get_mut(k) {
            node.prev = None;
            node.next = None;
        }
        Some(())
    }

    fn attach_back(&mut self, k: DefaultKey) {
        let old_tail = self.tail;
        if let Some(node) = self.slots.get_mut(k) {
            node.prev = old_tail;
            node.next = None;
        } else {
            return;
        }
        match old_tail {
            Some(t) => {
                if let Some(node) = self.slots.get_mut(t) {
                    node.next = Some(k);
                }
            }
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Walks the links in both directions and checks them against the slots.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none() && self.tail.is_none());
            assert_eq!(self.len(), 0);
            return;
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = self.slots.get(k).expect("linked slot must be live");
            assert_eq!(node.prev, prev, "broken back link");
            count += 1;
            assert!(count <= self.len(), "cycle in entry links");
            prev = Some(k);
            cur = node.next;
        }
        assert_eq!(prev, self.tail, "tail does not terminate the chain");
        assert_eq!(count, self.len(), "unlinked slots present");
    }
}

/// Iterator over `(&K, &V)` in FIFO order.
pub struct Iter<'a, K, V> {
    list: &'a EntryList<K, V>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.slots.get(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.slots.get(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> core::iter::FusedIterator for Iter<'a, K, V> {}
