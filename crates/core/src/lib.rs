// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-core: versioned resource model and event dispatch for the Relay
//! pipeline engine.
//!
//! The pieces here are domain-neutral: an event dispatcher with re-entrancy
//! protection, a versioned pool-bounded [`Resource`] abstraction with its
//! concrete kinds, the schema registry that constructs them, and the
//! insertion-ordered instance map that holds a pipeline's live resources.

pub mod clock;
pub mod error;
pub mod event;
pub mod resource;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::ResourceError;
pub use event::{EventDispatcher, EventPayload, HandlerError, RESOURCE_UPDATED};
pub use resource::base::{PoolSize, ResourceBase, ResourceConfig, ResourceContext};
pub use resource::creator::ResourceCreator;
pub use resource::data::{Frame, ResourceData};
pub use resource::instance::ResourceInstanceManager;
pub use resource::record::{DataItem, DataToken, ResourceRecord};
pub use resource::{Resource, SharedResource};
pub use store::{Deleted, FileStore, StoreError, Uploaded};
