//! Logging collaborator used by the queue.
//!
//! The queue reports diagnostic records (such as the number of consumed
//! items) through an injected [`QueueLogger`]. The default implementation
//! forwards records to `tracing`.

use serde_json::{Map, Value};
use std::sync::Arc;

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

/// Structured fields attached to a log record.
pub type LogFields = Map<String, Value>;

/// Scope used by queues that were not given an explicit logger.
pub const DEFAULT_SCOPE: &str = "generator_queue";

/// Sink for queue diagnostic records.
///
/// Implementations must not panic; a failing sink swallows its own errors.
#[cfg_attr(test, mockall::automock)]
pub trait QueueLogger: Send + Sync {
    /// Record a debug-level event with structured fields
    fn debug(&self, event: &str, fields: &LogFields);
}

/// Logger that forwards records to `tracing` at debug level
#[derive(Debug, Clone)]
pub struct TracingLogger {
    scope: String,
}

impl TracingLogger {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE)
    }
}

impl QueueLogger for TracingLogger {
    fn debug(&self, event: &str, fields: &LogFields) {
        let record = Value::Object(fields.clone());
        tracing::debug!(
            scope = %self.scope,
            event = event,
            fields = %record,
            "Queue event"
        );
    }
}

/// Logger that discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl QueueLogger for NoopLogger {
    fn debug(&self, _event: &str, _fields: &LogFields) {}
}

/// Create the default logger for a named scope.
pub fn logger_for_scope(scope: &str) -> Arc<dyn QueueLogger> {
    Arc::new(TracingLogger::new(scope))
}
