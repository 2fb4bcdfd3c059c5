//! Error type for precondition failures on `KvFifo`.

use core::fmt;

/// Returned when an operation's precondition does not hold.
///
/// Failing calls never mutate the queue: `len()`, `count()` and key
/// iteration are the same before and after.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FifoError {
    /// `pop`, `front`, `back` (and their `_mut` forms) on an empty queue.
    EmptyQueue,
    /// A keyed operation named a key with no entries.
    KeyNotFound,
}

impl fmt::Display for FifoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FifoError::EmptyQueue => f.write_str("empty queue"),
            FifoError::KeyNotFound => f.write_str("key not found"),
        }
    }
}

impl std::error::Error for FifoError {}
