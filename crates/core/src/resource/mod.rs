// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned, pool-bounded resources.
//!
//! A resource is one logical artifact in a pipeline (an image, a number, a
//! device list). Nodes never hand values to each other as arguments; a node
//! writes its outputs into resources keyed by stable strings and downstream
//! nodes read them back by key. Every write appends a versioned item to a
//! bounded pool and fires a `resource_updated` notification.

pub mod base;
pub mod creator;
pub mod data;
pub mod instance;
pub mod kinds;
pub mod record;

use crate::error::ResourceError;
use base::ResourceBase;
use parking_lot::Mutex;
use record::{DataItem, DataToken, ResourceRecord};
use std::sync::Arc;

/// Live resources are shared between their owning node (sole writer) and
/// the instance manager; consumers look them up by key each tick.
pub type SharedResource = Arc<Mutex<dyn Resource>>;

/// One resource kind. Implementations embed [`ResourceBase`] for the shared
/// pool/version/key machinery and add kind-specific serialization.
pub trait Resource: Send {
    /// Schema identifier, e.g. `image.v1`.
    fn schema(&self) -> &'static str;

    fn base(&self) -> &ResourceBase;

    fn base_mut(&mut self) -> &mut ResourceBase;

    /// Append a new versioned item (valid for `data = None`), evicting the
    /// oldest entry when the pool is full, and emit `resource_updated`.
    ///
    /// Collection kinds override this to reconcile their siblings.
    fn set_data(&mut self, data: Option<data::ResourceData>) -> DataItem {
        self.base_mut().push(data)
    }

    /// Serialized records: one for this resource, then each sibling's
    /// records concatenated in order.
    fn serialize(&self) -> Result<Vec<ResourceRecord>, ResourceError>;

    /// Release kind-specific external state (stored files, device handles)
    /// and dispose all siblings. Failures are logged, never surfaced.
    fn dispose(&mut self) {
        self.base_mut().dispose_siblings();
    }

    // -- provided accessors over the embedded base --

    fn key(&self) -> &str {
        self.base().key()
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn version(&self) -> u64 {
        self.base().version()
    }

    /// The item holding `version`, or the latest when `None`.
    fn get_item(&self, version: Option<u64>) -> Option<DataItem> {
        self.base().item(version).cloned()
    }

    /// The data of `version`, or of the latest item when `None`.
    fn get_data(&self, version: Option<u64>) -> Option<data::ResourceData> {
        self.base().item(version).and_then(|item| item.data.clone())
    }

    /// Change token for the latest item, or `None` if nothing was appended.
    fn create_token(&self) -> Option<DataToken> {
        self.base().latest_token()
    }

    fn siblings(&self) -> Vec<SharedResource> {
        self.base().siblings().to_vec()
    }
}

impl std::fmt::Debug for dyn Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource").field("schema", &self.schema()).field("key", &self.key()).finish()
    }
}
