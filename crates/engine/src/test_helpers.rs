// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for this crate's tests.

use crate::node::NodeContext;
use relay_core::test_support::{self, TestStore};
use relay_core::{EventDispatcher, FakeClock, ResourceCreator, ResourceInstanceManager};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) struct Rig {
    pub events: Arc<EventDispatcher>,
    pub creator: Arc<ResourceCreator>,
    pub resources: Arc<ResourceInstanceManager>,
    pub store: Arc<TestStore>,
    pub clock: FakeClock,
    pub stop: Arc<AtomicBool>,
}

pub(crate) fn rig() -> Rig {
    let t = test_support::context();
    Rig {
        events: t.events,
        creator: Arc::new(ResourceCreator::builtin(t.ctx)),
        resources: Arc::new(ResourceInstanceManager::new()),
        store: t.store,
        clock: t.clock,
        stop: Arc::new(AtomicBool::new(false)),
    }
}

impl Rig {
    pub fn node_context(&self, next_index: Option<usize>) -> NodeContext {
        NodeContext::new(
            self.events.clone(),
            self.creator.clone(),
            self.resources.clone(),
            self.store.clone(),
            Arc::new(self.clock.clone()),
            self.stop.clone(),
        )
        .with_next_index(next_index)
    }
}
