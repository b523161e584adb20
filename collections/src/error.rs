//! Error types for queue operations.

use std::error::Error;
use std::fmt;

use thiserror::Error;

/// Reason a [`Queue`](crate::Queue) rejected an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue has been closed; closing is final.
    #[error("queue: closed")]
    Closed,
    /// The backing storage could not be doubled past `capacity` slots.
    #[error("queue: cannot grow beyond {capacity} slots")]
    Grow { capacity: usize },
}

/// Error returned by [`Queue::put`](crate::Queue::put).
///
/// The rejected item is handed back to the caller and can be recovered
/// with [`PutError::into_inner`].
pub struct PutError<T> {
    kind: QueueError,
    item: T,
}

impl<T> PutError<T> {
    pub(crate) fn new(kind: QueueError, item: T) -> Self {
        PutError { kind, item }
    }

    /// Returns why the item was rejected.
    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Returns true if the item was rejected because the queue is closed.
    pub fn is_closed(&self) -> bool {
        self.kind == QueueError::Closed
    }

    /// Returns a reference to the rejected item.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Consumes the error, returning the rejected item.
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl<T> Error for PutError<T> {}

/// Error returned by [`Queue::put_all`](crate::Queue::put_all).
///
/// Items before the rejected one stay enqueued; [`enqueued`](Self::enqueued)
/// says how many. The rejected item and every item after it are handed
/// back by [`into_inner`](Self::into_inner).
pub struct PutAllError<T> {
    kind: QueueError,
    enqueued: usize,
    items: Vec<T>,
}

impl<T> PutAllError<T> {
    pub(crate) fn new(kind: QueueError, enqueued: usize, items: Vec<T>) -> Self {
        PutAllError {
            kind,
            enqueued,
            items,
        }
    }

    /// Returns why the first unsent item was rejected.
    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Returns true if the items were rejected because the queue is closed.
    pub fn is_closed(&self) -> bool {
        self.kind == QueueError::Closed
    }

    /// Returns how many items were enqueued before the rejection.
    pub fn enqueued(&self) -> usize {
        self.enqueued
    }

    /// Returns the items that were not enqueued, in their original order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consumes the error, returning the items that were not enqueued.
    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> fmt::Debug for PutAllError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutAllError")
            .field("kind", &self.kind)
            .field("enqueued", &self.enqueued)
            .field("rejected", &self.items.len())
            .finish()
    }
}

impl<T> fmt::Display for PutAllError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} items enqueued", self.kind, self.enqueued)
    }
}

impl<T> Error for PutAllError<T> {}

/// Error returned by [`Queue::pop_timeout`](crate::Queue::pop_timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PopTimeoutError {
    /// The deadline passed while the queue stayed open and empty.
    #[error("queue: pop timed out")]
    Timeout,
    /// The queue is closed and fully drained.
    #[error("queue: closed")]
    Closed,
}
