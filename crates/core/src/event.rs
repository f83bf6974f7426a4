// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named-event dispatcher with re-entrancy protection.
//!
//! Handlers commonly emit further events (node A's handler fires
//! `node_start_1`, whose handler fires `node_start_2`, and the tail wraps
//! back to `node_start_0`). A naive dispatcher would recurse once per hop
//! and blow the stack on long-running loops, so `emit` serializes onto an
//! internal queue: while a dispatch is in progress further emits append and
//! return, and the outermost call drains the queue iteratively.

use crate::resource::record::DataToken;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Event name fired on every `set_data`, payload [`EventPayload::Token`].
pub const RESOURCE_UPDATED: &str = "resource_updated";

/// Payload delivered to event handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Pure signal, no data (node hand-off events).
    Empty,
    /// Change notification for a resource version.
    Token(DataToken),
}

impl EventPayload {
    pub fn token(&self) -> Option<&DataToken> {
        match self {
            EventPayload::Token(token) => Some(token),
            EventPayload::Empty => None,
        }
    }
}

/// Error type handlers may surface; logged, never fatal to the drain.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

type Handler = Arc<dyn Fn(&EventPayload) -> Result<(), HandlerError> + Send + Sync>;

#[derive(Default)]
struct DispatchState {
    queue: VecDeque<(String, EventPayload)>,
    is_emitting: bool,
}

/// Subscribe/emit dispatcher driving node-to-node hand-off.
pub struct EventDispatcher {
    listeners: Mutex<HashMap<String, Vec<Handler>>>,
    state: Mutex<DispatchState>,
    debug: bool,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Per-emit logging is gated behind `RELAY_EVENT_DEBUG=1`; the hot path
    /// does no I/O when the toggle is off.
    pub fn new() -> Self {
        let debug = std::env::var("RELAY_EVENT_DEBUG").is_ok_and(|v| v == "1");
        Self::with_debug(debug)
    }

    pub fn with_debug(debug: bool) -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            state: Mutex::new(DispatchState::default()),
            debug,
        }
    }

    /// Register a handler. Handlers for one event run in registration order.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&EventPayload) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.listeners.lock().entry(event.to_string()).or_default().push(Arc::new(handler));
    }

    /// Deliver `payload` to every handler registered for `event`.
    ///
    /// If a dispatch is already in progress (on this or another thread), the
    /// event is queued and picked up by the active drain. Handler errors are
    /// logged and do not cancel subsequent handlers or queued events.
    pub fn emit(&self, event: &str, payload: EventPayload) {
        {
            let mut state = self.state.lock();
            state.queue.push_back((event.to_string(), payload));
            if state.is_emitting {
                return;
            }
            state.is_emitting = true;
        }

        // Reset is_emitting even if a handler unwinds, so a poisoned flag
        // can't silence the dispatcher forever. Disarmed on the normal
        // exit path, where the flag is cleared under the same lock as the
        // emptiness check.
        let mut guard = DrainGuard { state: &self.state, armed: true };

        loop {
            let (event, payload) = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(entry) => entry,
                    None => {
                        state.is_emitting = false;
                        guard.armed = false;
                        return;
                    }
                }
            };

            if self.debug {
                debug!(event = %event, "dispatch");
            }

            // Snapshot so handlers may register more handlers mid-dispatch.
            let handlers: Vec<Handler> = self
                .listeners
                .lock()
                .get(&event)
                .map(|hs| hs.to_vec())
                .unwrap_or_default();

            for handler in handlers {
                if let Err(err) = handler(&payload) {
                    warn!(event = %event, error = %err, "event handler failed");
                }
            }
        }
    }

    /// Number of handlers registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }
}

struct DrainGuard<'a> {
    state: &'a Mutex<DispatchState>,
    armed: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().is_emitting = false;
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
