//! Thread-safe producer/consumer collections.
//!
//! This crate provides [`Queue<T>`], a blocking FIFO queue for handing values
//! between any number of producer and consumer threads.
//!
//! # Queue (Auto-growing, Blocking)
//!
//! Producers never block: the backing ring doubles whenever one more item
//! would fill it. Consumers block in [`Queue::pop`] until an item arrives or
//! the queue is closed.
//!
//! ```
//! use giztoy_collections::Queue;
//!
//! let queue = Queue::<i32>::new(2);
//! queue.put(1).unwrap();
//! queue.put(2).unwrap();  // Ring grows from 2 to 4 slots
//!
//! assert_eq!(queue.pop(), Some(1));
//! assert_eq!(queue.pop(), Some(2));
//! ```
//!
//! # Closing
//!
//! [`Queue::close`] is one-way. Puts after close are rejected and hand the
//! item back; consumers keep draining what is left and then get `None`.
//!
//! ```
//! use giztoy_collections::Queue;
//!
//! let queue = Queue::new(4);
//! queue.put("a").unwrap();
//! assert!(queue.close());
//! assert!(!queue.close());
//!
//! assert_eq!(queue.put("b").unwrap_err().into_inner(), "b");
//! assert_eq!(queue.pop(), Some("a"));
//! assert_eq!(queue.pop(), None);
//! ```
//!
//! # Thread Safety
//!
//! `Queue<T>` is `Send + Sync` for `T: Send` and can be shared between
//! threads using `Clone` (which shares the underlying queue via `Arc`).

mod error;
mod queue;

pub use error::{PopTimeoutError, PutAllError, PutError, QueueError};
pub use queue::{DEFAULT_CAPACITY, IntoIter, Iter, Queue};
