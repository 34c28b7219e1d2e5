//! Thread-safe handle over a [`GeneratorQueue`].
//!
//! Dispatch and consume each hold the lock across their whole
//! read-modify-write span, so the size check and append of a dispatch, and
//! the length check and removal of a consume, are never interleaved with
//! another caller.

use crate::config::QueueOptions;
use crate::error::QueueError;
use crate::queue::GeneratorQueue;
use std::iter::FusedIterator;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;

/// Cloneable, lock-protected queue handle
pub struct SharedGeneratorQueue<T> {
    inner: Arc<Mutex<GeneratorQueue<T>>>,
}

impl<T> SharedGeneratorQueue<T> {
    pub fn new(queue: GeneratorQueue<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(queue)),
        }
    }

    /// Append a batch, see [`GeneratorQueue::dispatch`].
    pub fn dispatch(&self, batch: Vec<T>) -> Result<usize, QueueError> {
        self.lock().dispatch(batch)
    }

    /// Prepare a one-shot drain, see [`GeneratorQueue::consume`].
    ///
    /// The lock is taken only when the returned iterator is first advanced.
    pub fn consume(&self, limit: Option<usize>) -> SharedConsume<T> {
        SharedConsume {
            queue: Some(Arc::clone(&self.inner)),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn options(&self) -> QueueOptions {
        *self.lock().options()
    }

    // Poisoned locks are recovered. Dispatch and consume do not panic
    // mid-update; the one call made with items already drained is the
    // injected logger, which must not panic per the QueueLogger contract.
    fn lock(&self) -> MutexGuard<'_, GeneratorQueue<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for SharedGeneratorQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> From<GeneratorQueue<T>> for SharedGeneratorQueue<T> {
    fn from(queue: GeneratorQueue<T>) -> Self {
        Self::new(queue)
    }
}

impl<T> Default for SharedGeneratorQueue<T> {
    fn default() -> Self {
        Self::new(GeneratorQueue::new())
    }
}

/// Owned one-shot iterator returned by [`SharedGeneratorQueue::consume`].
#[must_use = "consume does nothing until the iterator is advanced"]
pub struct SharedConsume<T> {
    queue: Option<Arc<Mutex<GeneratorQueue<T>>>>,
    limit: Option<usize>,
}

impl<T> Iterator for SharedConsume<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let queue = self.queue.take()?;
        let mut guard = queue.lock().unwrap_or_else(PoisonError::into_inner);
        guard.take_batch(self.limit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.queue {
            Some(_) => (0, Some(1)),
            None => (0, Some(0)),
        }
    }
}

impl<T> FusedIterator for SharedConsume<T> {}
