//! kv-fifo: a single-threaded FIFO queue of `(key, value)` entries with
//! per-key access, whose handles share storage copy-on-write.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(log n) access to the first/last entry for a key on top of a
//!   plain FIFO, with cheap handle clones and strong panic safety.
//! - Layers:
//!   - EntryList<K, V>: FIFO sequence in a `SlotMap`, doubly linked by slot
//!     keys; hands out stable `Position`s.
//!   - KeyIndex<K>: `BTreeMap<K, VecDeque<Position>>`, one list per key in
//!     FIFO order.
//!   - Shared<K, V>: the two above, kept in step; the unit that is
//!     reference counted and deep-copied on divergence.
//!   - Transaction: snapshot-and-restore guard around each mutating call.
//!   - KvFifo<K, V>: public handle; `Rc<Shared>` plus an unshareable flag.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (plain `Rc`, no atomics). Handles
//!   that share storage need no synchronization because none of them can
//!   write to it without diverging first.
//! - Keys are immutable once pushed; only values are lent out mutably.
//! - Positions are generational slot keys, never addresses, so the index
//!   cannot dangle and a copy rebuilds it over its own positions.
//!
//! Sharing protocol
//! - Clone shares the `Rc`. A mutating call diverges (deep copy) when the
//!   state has another owner besides the call's own transaction snapshot.
//! - `front_mut`/`back_mut`/`first_mut`/`last_mut` diverge the same way and
//!   then mark the handle unshareable. A marked handle is copied, not shared,
//!   when cloned, and it writes in place without diverging. The next plain
//!   mutation clears the mark.
//!
//! Panic safety
//! - User code runs in `K: Clone`, `K: Ord` and `V: Clone`. If any of it
//!   panics during a mutating call, the handle is left as before the call:
//!   same storage, same flag, same entries. `Shared` undoes its own partial
//!   steps (a pushed entry whose key could not be indexed is unlinked), and
//!   the transaction swaps back the pre-call storage if the call diverged.
//!
//! Notes and non-goals
//! - No persistence or serialization.
//! - Failing operations return `FifoError` and change nothing.

mod error;
mod key_index;
mod keys;
mod kv_fifo;
mod kv_fifo_proptest;
mod shared;
mod transaction;

#[cfg(feature = "bench_internal")]
pub mod entry_list;
#[cfg(not(feature = "bench_internal"))]
mod entry_list;

// Public surface
pub use entry_list::Iter;
pub use error::FifoError;
pub use keys::Keys;
pub use kv_fifo::KvFifo;
