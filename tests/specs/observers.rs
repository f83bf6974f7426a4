// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer backpressure: the fan-out queue is bounded and lossy.

use relay_engine::{Observer, ObserverError, ObserverHub};
use relay_wire::StreamMessage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn message(tag: usize) -> StreamMessage {
    StreamMessage::CycleComplete {
        message: format!("m{tag}"),
        timestamp: "2026-01-01T00:00:00+00:00".to_string(),
    }
}

/// Observer slower than the publisher, counting what it actually got.
struct SlowObserver {
    received: Arc<AtomicUsize>,
}

impl Observer for SlowObserver {
    fn send(&self, _message: &StreamMessage) -> Result<(), ObserverError> {
        std::thread::sleep(Duration::from_millis(30));
        self.received.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn queue_is_bounded_and_drops_oldest() {
    let hub = ObserverHub::new(2);
    let received = Arc::new(AtomicUsize::new(0));
    hub.subscribe(Box::new(SlowObserver { received: received.clone() }));

    for tag in 0..5 {
        hub.publish(message(tag));
        assert!(hub.queued() <= 2);
    }

    // The slow observer drains what survived; it can never see more than
    // what fit through the bounded queue, and nothing crashed.
    let deadline = Instant::now() + Duration::from_secs(2);
    while hub.queued() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    std::thread::sleep(Duration::from_millis(50));

    let count = received.load(Ordering::SeqCst);
    assert!(count >= 1, "observer saw nothing");
    assert!(count < 5, "lossy queue delivered everything despite overflow");
}

#[test]
fn publishing_without_observers_discards_quietly() {
    let hub = ObserverHub::new(2);
    for tag in 0..10 {
        hub.publish(message(tag));
    }
    let deadline = Instant::now() + Duration::from_secs(1);
    while hub.queued() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(hub.queued(), 0);
}
