//! Transaction: snapshot-and-restore guard around one mutating call.
//!
//! `begin` captures the handle's `(shared state, unshareable)` pair. If the
//! guard is dropped without `commit` (early error return or unwinding panic)
//! the handle gets that pair back, so a failed call leaves it pointing at the
//! same storage with the same flag as before.
//!
//! The guard answers "did we end up on the wrong Shared State"; keeping the
//! sequence and index consistent with each other inside one Shared State is
//! `Shared`'s job.

use crate::kv_fifo::KvFifo;
use crate::shared::Shared;
use std::rc::Rc;

/// What the handle's unshareable flag becomes once the state is writable.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Sharing {
    /// Plain mutation: any earlier mutable reference is now stale.
    Shareable,
    /// A mutable reference is about to be handed out.
    Unshareable,
}

impl Sharing {
    fn flag(self) -> bool {
        self == Sharing::Unshareable
    }
}

struct Snapshot<K, V> {
    // `None` once we know the state was not replaced; only the flag is restored then.
    shared: Option<Rc<Shared<K, V>>>,
    unshareable: bool,
}

pub(crate) struct Transaction<'a, K, V> {
    fifo: &'a mut KvFifo<K, V>,
    snapshot: Option<Snapshot<K, V>>,
}

impl<'a, K, V> Transaction<'a, K, V> {
    pub(crate) fn begin(fifo: &'a mut KvFifo<K, V>) -> Self {
        let snapshot = Snapshot {
            shared: Some(Rc::clone(&fifo.shared)),
            unshareable: fifo.unshareable,
        };
        Self {
            fifo,
            snapshot: Some(snapshot),
        }
    }

    /// Keep whatever the call did.
    pub(crate) fn commit(mut self) {
        self.snapshot = None;
    }

    fn snapshot_owners(&self) -> usize {
        self.snapshot
            .as_ref()
            .map_or(0, |s| usize::from(s.shared.is_some()))
    }

    /// Owners of the current state other than this transaction.
    fn owners(&self) -> usize {
        Rc::strong_count(&self.fifo.shared) - self.snapshot_owners()
    }

    // Drops the snapshot's reference when it is the state we are about to
    // write, so the handle becomes its sole owner again.
    fn release_snapshot_ref(&mut self) {
        if let Some(s) = self.snapshot.as_mut() {
            s.shared = None;
        }
    }

    /// Makes the state exclusively writable and sets the flag to `mode`.
    ///
    /// Diverges when someone else owns the state, unless the handle is
    /// already unshareable: then an outstanding mutable reference may point
    /// into exactly this storage and it must stay put.
    pub(crate) fn unshare(&mut self, mode: Sharing) -> &mut Shared<K, V>
    where
        K: Ord + Clone,
        V: Clone,
    {
        self.diverge_with(mode, |s| s.clone())
    }

    /// Like `unshare`, but a diverging handle starts from an empty state
    /// instead of a copy. For calls that discard every entry anyway.
    pub(crate) fn unshare_empty(&mut self, mode: Sharing) -> &mut Shared<K, V>
    where
        K: Ord + Clone,
        V: Clone,
    {
        self.diverge_with(mode, |_| Shared::new())
    }

    fn diverge_with<F>(&mut self, mode: Sharing, fresh: F) -> &mut Shared<K, V>
    where
        K: Ord + Clone,
        V: Clone,
        F: FnOnce(&Shared<K, V>) -> Shared<K, V>,
    {
        if self.owners() > 1 && !self.fifo.unshareable {
            // A panic inside `fresh` leaves the handle untouched.
            let copy = fresh(&*self.fifo.shared);
            self.fifo.shared = Rc::new(copy);
        } else {
            self.release_snapshot_ref();
        }
        self.fifo.unshareable = mode.flag();
        // An unshareable handle is never shared (clones of it deep-copy), so
        // the handle is the sole owner here and this does not copy.
        Rc::make_mut(&mut self.fifo.shared)
    }
}

impl<'a, K, V> Drop for Transaction<'a, K, V> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            if let Some(shared) = snapshot.shared {
                self.fifo.shared = shared;
            }
            self.fifo.unshareable = snapshot.unshareable;
        }
    }
}
