//! Auto-growing blocking FIFO queue.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::error::{PopTimeoutError, PutAllError, PutError, QueueError};

/// Slot count used by [`Queue::default`].
pub const DEFAULT_CAPACITY: usize = 16;

/// A thread-safe, auto-growing blocking FIFO queue.
///
/// `Queue<T>` hands values from any number of producers to any number of
/// consumers. Producers never block: when the backing ring is about to fill
/// up it doubles in place. Consumers block while the queue is open and
/// empty.
///
/// # Semantics
///
/// - **Put**: Never blocks (auto-grows), fails only when closed
/// - **Pop**: Blocks when empty, returns `None` once closed and drained
/// - **Close**: One-way; wakes every blocked consumer so they can drain
///
/// One slot of the ring is always kept vacant, so a queue created with
/// `capacity` slots holds `capacity - 1` items before its first growth.
///
/// # Example
///
/// ```
/// use giztoy_collections::Queue;
/// use std::thread;
///
/// let queue = Queue::<i32>::new(4);
/// let producer_queue = queue.clone();
///
/// let producer = thread::spawn(move || {
///     for i in 0..10 {
///         producer_queue.put(i).unwrap();
///     }
///     producer_queue.close();
/// });
///
/// let mut items = Vec::new();
/// while let Some(item) = queue.pop() {
///     items.push(item);
/// }
///
/// producer.join().unwrap();
/// assert_eq!(items, (0..10).collect::<Vec<_>>());
/// ```
pub struct Queue<T> {
    inner: Arc<QueueInner<T>>,
}

struct QueueInner<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
}

struct QueueState<T> {
    ring: Ring<T>,
    closed: bool,
}

/// Circular storage with a reserved empty slot.
///
/// `start == end` always means empty, so at most `capacity - 1` slots are
/// occupied. Only reachable through the queue's mutex.
struct Ring<T> {
    slots: Vec<Option<T>>,
    start: usize, // oldest occupied slot
    end: usize,   // next free slot
    #[cfg(test)]
    fail_grow: bool,
}

impl<T> Ring<T> {
    fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ring {
            slots,
            start: 0,
            end: 0,
            #[cfg(test)]
            fail_grow: false,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn occupied(&self) -> usize {
        let capacity = self.capacity();
        (self.end + capacity - self.start) % capacity
    }

    /// Writes `item` at `end`. The caller must have grown the ring first.
    fn append(&mut self, item: T) {
        debug_assert!(self.occupied() < self.capacity() - 1);
        self.slots[self.end] = Some(item);
        self.end = (self.end + 1) % self.capacity();
    }

    fn remove_oldest(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let item = self.slots[self.start].take();
        self.start = (self.start + 1) % self.capacity();
        item
    }

    /// Doubles the storage when one more append would consume the reserved
    /// slot, relocating the occupied run to the front of the new storage.
    ///
    /// On failure the ring is left untouched.
    fn grow_if_near_full(&mut self) -> Result<(), QueueError> {
        let old_capacity = self.capacity();
        if (self.end + 1) % old_capacity != self.start {
            return Ok(());
        }

        let overflow = QueueError::Grow {
            capacity: old_capacity,
        };
        #[cfg(test)]
        if self.fail_grow {
            return Err(overflow);
        }
        let new_capacity = old_capacity.checked_mul(2).ok_or(overflow)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(new_capacity)
            .map_err(|_| overflow)?;

        if self.end > self.start {
            slots.extend(self.slots[self.start..self.end].iter_mut().map(Option::take));
        } else if self.end < self.start {
            // Wrapped: [start, capacity) then [0, end).
            slots.extend(self.slots[self.start..].iter_mut().map(Option::take));
            slots.extend(self.slots[..self.end].iter_mut().map(Option::take));
        }
        slots.resize_with(new_capacity, || None);

        self.slots = slots;
        self.start = 0;
        self.end = old_capacity - 1;

        trace!(
            old_capacity,
            new_capacity,
            occupied = self.end,
            "queue grew"
        );
        Ok(())
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Queue {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Queue")
            .field("len", &state.ring.occupied())
            .field("capacity", &state.ring.capacity())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> Queue<T> {
    /// Creates a new Queue with `capacity` ring slots.
    ///
    /// The queue holds `capacity - 1` items before it first grows.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Queue {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState {
                    ring: Ring::new(capacity),
                    closed: false,
                }),
                not_empty: Condvar::new(),
            }),
        }
    }

    /// Returns the number of items currently queued.
    pub fn len(&self) -> usize {
        self.inner.state.lock().ring.occupied()
    }

    /// Returns true if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current number of ring slots.
    ///
    /// This only ever grows, by doubling. One slot is always vacant.
    pub fn capacity(&self) -> usize {
        self.inner.state.lock().ring.capacity()
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Closes the queue.
    ///
    /// Further puts are rejected; queued items can still be popped. Every
    /// blocked consumer is woken. Returns false if the queue was already
    /// closed.
    pub fn close(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        debug!(remaining = state.ring.occupied(), "queue closed");
        self.inner.not_empty.notify_all();
        true
    }

    /// Appends an item to the back of the queue.
    ///
    /// Never blocks. Grows the ring when needed and wakes one blocked
    /// consumer. Returns the item inside the error if the queue is closed
    /// or the ring cannot grow.
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        let mut state = self.inner.state.lock();
        Self::put_locked(&mut state, item)?;
        self.inner.not_empty.notify_one();
        Ok(())
    }

    /// Appends every item in order under a single lock acquisition.
    ///
    /// The iterator is collected before the lock is taken. Returns the
    /// number of items enqueued. On rejection the items already enqueued
    /// stay in the queue and the rest are handed back in the error.
    pub fn put_all<I>(&self, items: I) -> Result<usize, PutAllError<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        let mut state = self.inner.state.lock();
        let mut n = 0;
        let mut items = items.into_iter();
        while let Some(item) = items.next() {
            if let Err(err) = Self::put_locked(&mut state, item) {
                let kind = err.kind();
                let mut rejected = vec![err.into_inner()];
                rejected.extend(items);
                return Err(PutAllError::new(kind, n, rejected));
            }
            self.inner.not_empty.notify_one();
            n += 1;
        }
        Ok(n)
    }

    fn put_locked(state: &mut QueueState<T>, item: T) -> Result<(), PutError<T>> {
        if state.closed {
            return Err(PutError::new(QueueError::Closed, item));
        }
        if let Err(kind) = state.ring.grow_if_near_full() {
            return Err(PutError::new(kind, item));
        }
        state.ring.append(item);
        Ok(())
    }

    /// Removes the oldest item, blocking while the queue is open and empty.
    ///
    /// Returns `None` once the queue is closed and every item has been
    /// popped.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.inner.state.lock();
        loop {
            if let Some(item) = state.ring.remove_oldest() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.inner.not_empty.wait(&mut state);
        }
    }

    /// Removes the oldest item without blocking.
    ///
    /// Returns `None` whenever the queue is currently empty, open or not.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.state.lock().ring.remove_oldest()
    }

    /// Like [`pop`](Self::pop), but gives up once `timeout` has elapsed.
    ///
    /// Returns [`PopTimeoutError::Closed`] if the queue is closed and
    /// drained, and [`PopTimeoutError::Timeout`] if it stayed open and empty
    /// until the deadline.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, PopTimeoutError> {
        // An unrepresentable deadline waits forever.
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.inner.state.lock();
        loop {
            if let Some(item) = state.ring.remove_oldest() {
                return Ok(item);
            }
            if state.closed {
                return Err(PopTimeoutError::Closed);
            }
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Err(PopTimeoutError::Timeout);
                    }
                    self.inner.not_empty.wait_until(&mut state, deadline);
                }
                None => self.inner.not_empty.wait(&mut state),
            }
        }
    }

    /// Removes and returns every queued item without blocking.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.inner.state.lock();
        let mut items = Vec::with_capacity(state.ring.occupied());
        while let Some(item) = state.ring.remove_oldest() {
            items.push(item);
        }
        items
    }

    /// Returns a blocking iterator that pops until the queue is closed and
    /// drained.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { queue: self }
    }
}

/// Blocking iterator returned by [`Queue::iter`].
pub struct Iter<'a, T> {
    queue: &'a Queue<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning blocking iterator returned by `Queue::into_iter`.
pub struct IntoIter<T> {
    queue: Queue<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { queue: self }
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
