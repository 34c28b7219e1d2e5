//! Bounded FIFO queue store with batch dispatch and one-shot consumption.
//!
//! A [`GeneratorQueue`] owns its backing sequence exclusively:
//! - [`GeneratorQueue::dispatch`] appends a batch to the back and enforces
//!   the configured overflow policy
//! - [`GeneratorQueue::consume`] returns a lazy [`Consume`] iterator that,
//!   when first advanced, removes either every item or the oldest `limit`
//!   items and yields them as a single batch
//!
//! Capacity is only checked on dispatch. A queue seeded with more items than
//! its capacity is constructed without complaint.

use crate::config::{OverflowPolicy, QueueOptions};
use crate::error::{InputError, QueueError};
use crate::logging::{logger_for_scope, LogFields, QueueLogger, DEFAULT_SCOPE};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;

/// Event reported to the logger after every non-empty consume.
pub const CONSUMED_ELEMENTS_EVENT: &str = "CONSUMED_ELEMENTS";

/// Bounded, order-preserving batch queue
pub struct GeneratorQueue<T> {
    items: VecDeque<T>,
    options: QueueOptions,
    logger: Arc<dyn QueueLogger>,
}

impl<T> GeneratorQueue<T> {
    /// Create an empty queue with default options.
    pub fn new() -> Self {
        Self::build(Vec::new(), QueueOptions::default())
    }

    /// Create a queue seeded with `initial_state` using validated options.
    pub fn with_options(initial_state: Vec<T>, options: QueueOptions) -> Result<Self, QueueError> {
        options.validate()?;
        Ok(Self::build(initial_state, options))
    }

    /// Replace the logging collaborator.
    pub fn with_logger(mut self, logger: Arc<dyn QueueLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn build(initial_state: Vec<T>, options: QueueOptions) -> Self {
        tracing::debug!(
            capacity = options.capacity,
            overflow_policy = ?options.overflow_policy,
            initial_len = initial_state.len(),
            "Generator queue constructed"
        );

        Self {
            items: VecDeque::from(initial_state),
            options,
            logger: logger_for_scope(DEFAULT_SCOPE),
        }
    }

    /// Append a batch to the back of the queue.
    ///
    /// Returns the number of items held afterwards. With
    /// [`OverflowPolicy::Error`] an overflowing batch is still appended and
    /// the call fails with [`QueueError::CapacityExceeded`]; the queue stays
    /// usable and keeps those items. [`OverflowPolicy::Reject`] refuses the
    /// whole batch instead and leaves the queue untouched.
    pub fn dispatch(&mut self, batch: Vec<T>) -> Result<usize, QueueError> {
        let capacity = self.options.capacity;

        if self.options.overflow_policy == OverflowPolicy::Reject {
            let projected = self.items.len() + batch.len();
            if exceeds(projected, capacity) {
                tracing::warn!(
                    size = projected,
                    capacity = capacity,
                    "Queue rejected batch that would exceed capacity"
                );
                return Err(QueueError::CapacityRejected {
                    size: projected,
                    capacity,
                });
            }
        }

        self.items.extend(batch);
        let size = self.items.len();

        if exceeds(size, capacity) && self.options.overflow_policy == OverflowPolicy::Error {
            tracing::warn!(size = size, capacity = capacity, "Queue max size reached");
            return Err(QueueError::CapacityExceeded { size, capacity });
        }

        Ok(size)
    }

    /// Prepare a one-shot drain of the queue.
    ///
    /// Nothing is removed until the returned iterator is advanced. `None` or
    /// `Some(0)` drains every item; `Some(n)` drains at most the oldest `n`.
    pub fn consume(&mut self, limit: Option<usize>) -> Consume<'_, T> {
        Consume {
            queue: Some(self),
            limit,
        }
    }

    /// Remove the next batch. Returns `None` when the queue is empty.
    pub(crate) fn take_batch(&mut self, limit: Option<usize>) -> Option<Vec<T>> {
        if self.items.is_empty() {
            return None;
        }

        let count = match limit {
            Some(limit) if limit > 0 => limit.min(self.items.len()),
            _ => self.items.len(),
        };
        let batch: Vec<T> = self.items.drain(..count).collect();

        let mut fields = LogFields::new();
        fields.insert("amount".to_string(), Value::from(batch.len()));
        self.logger.debug(CONSUMED_ELEMENTS_EVENT, &fields);

        Some(batch)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn options(&self) -> &QueueOptions {
        &self.options
    }

    /// Iterate the held items, oldest first, without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: DeserializeOwned> GeneratorQueue<T> {
    /// Create a queue from loosely typed arguments.
    ///
    /// `initial_state` must be an array; `args` is validated key by key, see
    /// [`crate::config::validate_args`].
    pub fn from_args(
        initial_state: Value,
        args: Option<Map<String, Value>>,
    ) -> Result<Self, QueueError> {
        let mut args = args.unwrap_or_default();
        args.insert("initialState".to_string(), initial_state);

        let options = QueueOptions::from_args(&args)?;

        let initial_state = args.remove("initialState").unwrap_or(Value::Null);
        let items: Vec<T> = serde_json::from_value(initial_state).map_err(|e| {
            tracing::debug!(error = %e, "Initial state elements could not be decoded");
            QueueError::InvalidConfiguration {
                input_errors: vec![InputError::invalid("initialState")],
            }
        })?;

        Self::with_options(items, options)
    }
}

impl<T> Default for GeneratorQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for GeneratorQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorQueue")
            .field("items", &self.items)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn exceeds(size: usize, capacity: u64) -> bool {
    u64::try_from(size).map_or(true, |size| size > capacity)
}

/// One-shot iterator returned by [`GeneratorQueue::consume`].
///
/// Yields at most one batch and is exhausted afterwards.
#[must_use = "consume does nothing until the iterator is advanced"]
pub struct Consume<'a, T> {
    queue: Option<&'a mut GeneratorQueue<T>>,
    limit: Option<usize>,
}

impl<T> Iterator for Consume<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.take()?.take_batch(self.limit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.queue {
            Some(_) => (0, Some(1)),
            None => (0, Some(0)),
        }
    }
}

impl<T> FusedIterator for Consume<'_, T> {}
