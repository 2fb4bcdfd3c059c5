//! KvFifo: the user-facing handle.
//!
//! Cloning a handle shares its storage; the first mutation through a handle
//! whose storage is shared gives that handle a private copy. Handing out a
//! `&mut V` (the `_mut` accessors) marks the handle unshareable: a clone taken
//! while marked gets a deep copy, and the handle itself does not diverge
//! again until its next plain mutation clears the mark.

use crate::entry_list::{Iter, Position};
use crate::error::FifoError;
use crate::keys::Keys;
use crate::shared::Shared;
use crate::transaction::{Sharing, Transaction};
use core::borrow::Borrow;
use core::fmt;
use std::rc::Rc;

/// A FIFO queue of `(key, value)` entries with per-key access.
///
/// Keys may repeat. `first`/`last`/`pop_key`/`count` reach the entries for one
/// key in O(log n); `move_to_back` relocates all of them at once.
///
/// Single-threaded: handles are `!Send` and `!Sync`.
pub struct KvFifo<K, V> {
    pub(crate) shared: Rc<Shared<K, V>>,
    pub(crate) unshareable: bool,
}

impl<K: Ord, V> KvFifo<K, V> {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared::new()),
            unshareable: false,
        }
    }

    /// Number of entries holding `key`; 0 when absent.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.shared.index.count(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count(key) > 0
    }

    pub fn front(&self) -> Result<(&K, &V), FifoError> {
        self.entry_at(self.shared.entries.front())
            .ok_or(FifoError::EmptyQueue)
    }

    pub fn back(&self) -> Result<(&K, &V), FifoError> {
        self.entry_at(self.shared.entries.back())
            .ok_or(FifoError::EmptyQueue)
    }

    /// Earliest entry for `key`.
    pub fn first<Q>(&self, key: &Q) -> Result<(&K, &V), FifoError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.entry_at(self.shared.index.first(key))
            .ok_or(FifoError::KeyNotFound)
    }

    /// Latest entry for `key`.
    pub fn last<Q>(&self, key: &Q) -> Result<(&K, &V), FifoError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.entry_at(self.shared.index.last(key))
            .ok_or(FifoError::KeyNotFound)
    }

    /// Distinct keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K> {
        Keys::new(self.shared.index.keys())
    }

    fn entry_at(&self, pos: Option<Position>) -> Option<(&K, &V)> {
        self.shared.entries.get(pos?)
    }
}

impl<K, V> KvFifo<K, V> {
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.shared.entries.is_empty()
    }

    /// All entries in FIFO order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.shared.entries.iter()
    }

    /// Whether both handles currently read the same storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<K, V> KvFifo<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    /// Appends `(key, value)` at the back.
    pub fn push(&mut self, key: K, value: V) {
        let mut tx = Transaction::begin(self);
        tx.unshare(Sharing::Shareable).push(key, value);
        tx.commit();
    }

    /// Removes and returns the front entry.
    pub fn pop(&mut self) -> Result<(K, V), FifoError> {
        if self.is_empty() {
            return Err(FifoError::EmptyQueue);
        }
        let mut tx = Transaction::begin(self);
        let popped = tx
            .unshare(Sharing::Shareable)
            .pop_front()
            .ok_or(FifoError::EmptyQueue)?;
        tx.commit();
        Ok(popped)
    }

    /// Removes and returns the earliest entry for `key`.
    pub fn pop_key<Q>(&mut self, key: &Q) -> Result<(K, V), FifoError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if !self.contains_key(key) {
            return Err(FifoError::KeyNotFound);
        }
        let mut tx = Transaction::begin(self);
        let popped = tx
            .unshare(Sharing::Shareable)
            .pop_key(key)
            .ok_or(FifoError::KeyNotFound)?;
        tx.commit();
        Ok(popped)
    }

    /// Moves every entry for `key` to the back, keeping their relative
    /// order; all other entries keep theirs.
    pub fn move_to_back<Q>(&mut self, key: &Q) -> Result<(), FifoError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if !self.contains_key(key) {
            return Err(FifoError::KeyNotFound);
        }
        let mut tx = Transaction::begin(self);
        if !tx.unshare(Sharing::Shareable).move_key_to_back(key) {
            return Err(FifoError::KeyNotFound);
        }
        tx.commit();
        Ok(())
    }

    pub fn clear(&mut self) {
        let mut tx = Transaction::begin(self);
        tx.unshare_empty(Sharing::Shareable).clear();
        tx.commit();
    }

    /// Front entry with its value writable in place. Marks the handle
    /// unshareable.
    pub fn front_mut(&mut self) -> Result<(&K, &mut V), FifoError> {
        if self.is_empty() {
            return Err(FifoError::EmptyQueue);
        }
        self.hand_out(FifoError::EmptyQueue, |s| s.entries.front())
    }

    /// Back entry with its value writable in place. Marks the handle
    /// unshareable.
    pub fn back_mut(&mut self) -> Result<(&K, &mut V), FifoError> {
        if self.is_empty() {
            return Err(FifoError::EmptyQueue);
        }
        self.hand_out(FifoError::EmptyQueue, |s| s.entries.back())
    }

    pub fn first_mut<Q>(&mut self, key: &Q) -> Result<(&K, &mut V), FifoError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if !self.contains_key(key) {
            return Err(FifoError::KeyNotFound);
        }
        self.hand_out(FifoError::KeyNotFound, |s| s.index.first(key))
    }

    pub fn last_mut<Q>(&mut self, key: &Q) -> Result<(&K, &mut V), FifoError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if !self.contains_key(key) {
            return Err(FifoError::KeyNotFound);
        }
        self.hand_out(FifoError::KeyNotFound, |s| s.index.last(key))
    }

    // Diverges if shared, marks the handle unshareable, then lends out the
    // value at the located position.
    fn hand_out<F>(&mut self, missing: FifoError, locate: F) -> Result<(&K, &mut V), FifoError>
    where
        F: FnOnce(&Shared<K, V>) -> Option<Position>,
    {
        let mut tx = Transaction::begin(self);
        let pos = locate(&*tx.unshare(Sharing::Unshareable)).ok_or(missing)?;
        tx.commit();
        Rc::make_mut(&mut self.shared)
            .entries
            .get_mut(pos)
            .ok_or(missing)
    }
}

impl<K: Ord, V> Default for KvFifo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for KvFifo<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    /// Shares storage, unless `self` has a mutable reference out; then the
    /// clone gets its own copy. The clone always starts shareable.
    fn clone(&self) -> Self {
        let shared = if self.unshareable {
            Rc::new(Shared::clone(&self.shared))
        } else {
            Rc::clone(&self.shared)
        };
        Self {
            shared,
            unshareable: false,
        }
    }

    /// Assignment: `self` ends up shareable whatever either flag was.
    fn clone_from(&mut self, source: &Self) {
        *self = source.clone();
    }
}

impl<K, V> Extend<(K, V)> for KvFifo<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.push(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for KvFifo<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut q = KvFifo::new();
        q.extend(iter);
        q
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for KvFifo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
