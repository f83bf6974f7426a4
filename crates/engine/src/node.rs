// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node lifecycle contract.
//!
//! A node is one stage of a pipeline. It is constructed once per pipeline
//! start, `prepare`d once, then driven tick by tick through its
//! `node_start_{i}` event: execute, then hand off to the next node. Nodes
//! read inputs from the resource store by stable key and publish outputs
//! the same way; no node passes values to another as arguments.

use crate::error::NodeError;
use relay_core::{
    Clock, EventDispatcher, EventPayload, FileStore, ResourceCreator, ResourceInstanceManager,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Event name that triggers node `index`'s tick.
pub fn node_start_event(index: usize) -> String {
    format!("node_start_{index}")
}

/// Shared context handed to every node of one pipeline run.
#[derive(Clone)]
pub struct NodeContext {
    pub events: Arc<EventDispatcher>,
    pub creator: Arc<ResourceCreator>,
    pub resources: Arc<ResourceInstanceManager>,
    pub store: Arc<dyn FileStore>,
    pub clock: Arc<dyn Clock>,
    /// Raised on stop; checked before and after every execute.
    pub stop: Arc<AtomicBool>,
    next_index: Option<usize>,
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("next_index", &self.next_index)
            .finish()
    }
}

impl NodeContext {
    pub fn new(
        events: Arc<EventDispatcher>,
        creator: Arc<ResourceCreator>,
        resources: Arc<ResourceInstanceManager>,
        store: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self { events, creator, resources, store, clock, stop, next_index: None }
    }

    /// Injected by the pipeline manager: index of the next node, `None`
    /// for the tail.
    pub fn with_next_index(mut self, next_index: Option<usize>) -> Self {
        self.next_index = next_index;
        self
    }

    pub fn next_index(&self) -> Option<usize> {
        self.next_index
    }

    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Standard next-hop: fire the next node's start event, or wrap back
    /// to node 0 from the tail to close the loop.
    pub fn emit_next(&self) {
        self.emit_start(self.next_index.unwrap_or(0));
    }

    /// Fire a specific node's start event (conditional routing).
    pub fn emit_start(&self, index: usize) {
        self.events.emit(&node_start_event(index), EventPayload::Empty);
    }
}

/// One pipeline stage.
pub trait Node: Send {
    fn context(&self) -> &NodeContext;

    /// One-shot setup: open devices, publish long-lived resources,
    /// enumerate the environment. A failure here aborts the start.
    fn prepare(&mut self) -> Result<(), NodeError> {
        Ok(())
    }

    /// One tick of work. Transient input absence (missing upstream
    /// resource, empty frame) must early-return `Ok` so a single bad tick
    /// never breaks the loop.
    fn execute(&mut self) -> Result<(), NodeError>;

    /// Decide the next hop. The default chains to `next_index`, wrapping
    /// to node 0 from the tail; conditional nodes override this.
    fn next(&mut self) {
        self.context().emit_next();
    }

    /// Release device handles and dispose owned resources.
    fn dispose(&mut self) {}
}

impl std::fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").finish()
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
