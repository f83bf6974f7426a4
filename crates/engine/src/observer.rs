// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer fan-out.
//!
//! Pipeline notifications are fed through a bounded FIFO queue drained by
//! a dedicated thread. The stream is lossy by design: when the queue is
//! full the oldest pending message is evicted, and an observer whose send
//! fails or times out is removed from the active set. No retry, no
//! persistence.

use crate::error::ObserverError;
use parking_lot::{Condvar, Mutex};
use relay_wire::StreamMessage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default bound on a single observer send.
const SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// Receives the notification stream.
///
/// `send` must return within a short, bounded time; a slow consumer
/// reports [`ObserverError::Timeout`] instead of blocking the drain.
pub trait Observer: Send {
    fn send(&self, message: &StreamMessage) -> Result<(), ObserverError>;
}

struct Entry {
    id: String,
    observer: Box<dyn Observer>,
}

struct HubShared {
    capacity: usize,
    queue: Mutex<VecDeque<StreamMessage>>,
    available: Condvar,
    observers: Mutex<Vec<Entry>>,
    shutdown: AtomicBool,
}

/// Bounded, lossy fan-out hub with a dedicated drain thread.
pub struct ObserverHub {
    shared: Arc<HubShared>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl ObserverHub {
    pub fn new(capacity: usize) -> Self {
        let shared = Arc::new(HubShared {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            observers: Mutex::new(Vec::new()),
            shutdown: AtomicBool::new(false),
        });

        let drain = {
            let shared = shared.clone();
            std::thread::Builder::new()
                .name("relay-observers".to_string())
                .spawn(move || drain_loop(&shared))
                .ok()
        };
        if drain.is_none() {
            warn!("observer drain thread failed to spawn; stream is inert");
        }

        Self { shared, drain: Mutex::new(drain) }
    }

    /// Add an observer to the active set; returns its handle for
    /// `unsubscribe`.
    pub fn subscribe(&self, observer: Box<dyn Observer>) -> String {
        let id = format!("obs-{}", nanoid::nanoid!(8));
        self.shared.observers.lock().push(Entry { id: id.clone(), observer });
        id
    }

    pub fn unsubscribe(&self, id: &str) {
        self.shared.observers.lock().retain(|entry| entry.id != id);
    }

    pub fn observer_count(&self) -> usize {
        self.shared.observers.lock().len()
    }

    /// Enqueue a message, evicting the oldest pending one when full.
    pub fn publish(&self, message: StreamMessage) {
        {
            let mut queue = self.shared.queue.lock();
            push_bounded(&mut queue, self.shared.capacity, message);
        }
        self.shared.available.notify_one();
    }

    /// Messages currently pending. Never exceeds the capacity.
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

impl Drop for ObserverHub {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.available.notify_all();
        if let Some(handle) = self.drain.lock().take() {
            let _ = handle.join();
        }
    }
}

/// FIFO drop-on-full: the oldest pending message makes room for the new
/// one.
fn push_bounded(queue: &mut VecDeque<StreamMessage>, capacity: usize, message: StreamMessage) {
    if queue.len() >= capacity {
        let dropped = queue.pop_front();
        debug!(kind = dropped.as_ref().map(StreamMessage::kind), "observer queue full, dropped oldest");
    }
    queue.push_back(message);
}

fn drain_loop(shared: &HubShared) {
    loop {
        let message = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(message) = queue.pop_front() {
                    break message;
                }
                if shared.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };

        let mut failed: Vec<String> = Vec::new();
        {
            let observers = shared.observers.lock();
            for entry in observers.iter() {
                if let Err(err) = entry.observer.send(&message) {
                    warn!(observer = %entry.id, error = %err, "observer dropped");
                    failed.push(entry.id.clone());
                }
            }
        }
        if !failed.is_empty() {
            shared.observers.lock().retain(|entry| !failed.contains(&entry.id));
        }
    }
}

/// Observer over a bounded channel. `send` retries a full channel until
/// the timeout elapses, then reports the observer as timed out.
pub struct ChannelObserver {
    tx: SyncSender<StreamMessage>,
    timeout: Duration,
}

impl ChannelObserver {
    pub fn new(tx: SyncSender<StreamMessage>) -> Self {
        Self { tx, timeout: SEND_TIMEOUT }
    }

    pub fn with_timeout(tx: SyncSender<StreamMessage>, timeout: Duration) -> Self {
        Self { tx, timeout }
    }
}

impl Observer for ChannelObserver {
    fn send(&self, message: &StreamMessage) -> Result<(), ObserverError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.tx.try_send(message.clone()) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Disconnected(_)) => return Err(ObserverError::Closed),
                Err(TrySendError::Full(_)) => {
                    if Instant::now() >= deadline {
                        return Err(ObserverError::Timeout);
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
