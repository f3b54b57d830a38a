//! Thread-safe FIFO queue.
//!
//! The queue never blocks waiting for elements; waiting is layered on top
//! by the pool's condition variables.

use std::collections::VecDeque;
use std::sync::RwLock;

/// A FIFO queue guarded by a reader/writer lock.
///
/// Size and emptiness queries take shared access and may proceed
/// concurrently; any mutation takes exclusive access. Insertion order is
/// preserved.
pub struct ConcurrentQueue<T> {
    inner: RwLock<VecDeque<T>>,
}

impl<T> ConcurrentQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(VecDeque::new()),
        }
    }

    /// Whether the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Number of queued elements.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Discard all queued elements.
    pub fn clear(&self) {
        self.inner.write().unwrap().clear();
    }

    /// Append an element to the back.
    pub fn push(&self, value: T) {
        self.inner.write().unwrap().push_back(value);
    }

    /// Remove and return the front element, or `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.write().unwrap().pop_front()
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
