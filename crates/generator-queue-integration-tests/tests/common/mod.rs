//! Common test utilities for generator-queue integration tests
//!
//! This module provides:
//! - A recording implementation of the logging collaborator
//! - Subscriber setup so `tracing` output shows up in failing tests
//! - Helper functions for creating queue fixtures

use generator_queue::{GeneratorQueue, LogFields, QueueLogger, QueueOptions};
use std::sync::{Arc, Mutex};

// ============================================================================
// Recording Logger
// ============================================================================

/// Logger that keeps every record it receives
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingLogger {
    records: Arc<Mutex<Vec<(String, LogFields)>>>,
}

#[allow(dead_code)]
impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far
    pub fn records(&self) -> Vec<(String, LogFields)> {
        self.records.lock().unwrap().clone()
    }

    /// `amount` field of every consume record, in order
    pub fn consumed_amounts(&self) -> Vec<u64> {
        self.records()
            .iter()
            .filter(|(event, _)| event == generator_queue::CONSUMED_ELEMENTS_EVENT)
            .filter_map(|(_, fields)| fields.get("amount").and_then(|v| v.as_u64()))
            .collect()
    }
}

impl QueueLogger for RecordingLogger {
    fn debug(&self, event: &str, fields: &LogFields) {
        self.records
            .lock()
            .unwrap()
            .push((event.to_string(), fields.clone()));
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Install a test-writer subscriber once per test binary.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "generator_queue=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Queue with default options wired to a recording logger
#[allow(dead_code)]
pub fn recorded_queue<T>() -> (GeneratorQueue<T>, RecordingLogger) {
    let logger = RecordingLogger::new();
    let queue = GeneratorQueue::new().with_logger(Arc::new(logger.clone()));
    (queue, logger)
}

/// Queue with the given capacity and error-on-overflow policy
#[allow(dead_code)]
pub fn queue_with_capacity<T>(capacity: u64) -> GeneratorQueue<T> {
    GeneratorQueue::with_options(Vec::new(), QueueOptions::with_capacity(capacity))
        .expect("capacity should be valid")
}

#[allow(dead_code)]
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
