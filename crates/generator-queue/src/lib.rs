//! # Generator Queue
//!
//! Bounded, order-preserving queue that buffers batches pushed by producers
//! and releases them to consumers in controlled batches.
//!
//! This library provides:
//! - Validated queue configuration (typed, loosely typed and layered sources)
//! - Batch dispatch with a configurable overflow policy
//! - Lazy, one-shot FIFO consumption with an optional batch limit
//! - A lock-protected handle for use across threads
//!
//! ## Module Organization
//!
//! - [`error`] - Error type shared by every queue operation
//! - [`config`] - Options, argument validation and settings loading
//! - [`logging`] - Injected logging collaborator
//! - [`queue`] - The queue store with dispatch and consume
//! - [`shared`] - Thread-safe queue handle

// Module declarations
pub mod config;
pub mod error;
pub mod logging;
pub mod queue;
pub mod shared;

// Re-export commonly used types at crate root for convenience
pub use config::{
    validate_args, OverflowPolicy, QueueOptions, QueueOrdering, QueueSettings, DEFAULT_CAPACITY,
    HARD_MAX_CAPACITY,
};
pub use error::{ErrorDetails, InputError, QueueError, INVALID_ARGS_TYPE};
pub use logging::{logger_for_scope, LogFields, NoopLogger, QueueLogger, TracingLogger};
pub use queue::{Consume, GeneratorQueue, CONSUMED_ELEMENTS_EVENT};
pub use shared::{SharedConsume, SharedGeneratorQueue};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
