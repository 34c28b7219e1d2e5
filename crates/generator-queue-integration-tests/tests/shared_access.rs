//! Integration tests for the thread-safe queue handle

mod common;

use common::{init_tracing, RecordingLogger};
use generator_queue::{GeneratorQueue, SharedGeneratorQueue};
use std::sync::Arc;
use std::thread;

/// Producers on several threads feed a consumer without losing items
#[test]
fn test_producers_and_consumer_across_threads() {
    init_tracing();
    let logger = RecordingLogger::new();
    let queue: SharedGeneratorQueue<u32> =
        GeneratorQueue::new().with_logger(Arc::new(logger.clone())).into();

    let producers: Vec<_> = (0..4u32)
        .map(|worker| {
            let handle = queue.clone();
            thread::spawn(move || {
                for i in 0..50u32 {
                    handle.dispatch(vec![worker * 1000 + i]).unwrap();
                }
            })
        })
        .collect();

    let mut received = Vec::new();
    for producer in producers {
        producer.join().unwrap();
        received.extend(queue.consume(Some(25)).flatten());
    }
    received.extend(queue.consume(None).flatten());

    assert_eq!(received.len(), 200);
    let total: u64 = logger.consumed_amounts().iter().sum();
    assert_eq!(total, 200);
}

/// The owned drain can be moved to another thread before it runs
#[test]
fn test_drain_moves_across_threads() {
    let queue = SharedGeneratorQueue::default();
    queue.dispatch(vec!["x", "y"]).unwrap();

    let drain = queue.consume(None);
    assert_eq!(queue.len(), 2);

    let batch = thread::spawn(move || drain.collect::<Vec<_>>())
        .join()
        .unwrap();

    assert_eq!(batch, vec![vec!["x", "y"]]);
    assert!(queue.is_empty());
}
