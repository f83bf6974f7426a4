// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live resource instances, keyed and insertion-ordered.

use super::record::ResourceRecord;
use super::SharedResource;
use crate::error::ResourceError;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

/// Key → live resource map for one pipeline run.
///
/// `set` is last-write-wins with no version check: a node may overwrite its
/// own resource every tick. The only rejected write is a binding whose key
/// disagrees with the resource's own derived key.
#[derive(Default)]
pub struct ResourceInstanceManager {
    inner: Mutex<IndexMap<String, SharedResource>>,
}

impl ResourceInstanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, resource: SharedResource) -> Result<(), ResourceError> {
        let actual = resource.lock().key().to_string();
        if actual != key {
            return Err(ResourceError::KeyMismatch { bound: key.to_string(), actual });
        }
        self.inner.lock().insert(key.to_string(), resource);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<SharedResource> {
        self.inner.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys().cloned().collect()
    }

    /// Dispose every resource and empty the map. Used when a pipeline
    /// restarts; dispose failures are logged inside the kinds, teardown
    /// continues regardless.
    pub fn clear_all(&self) {
        let drained: Vec<(String, SharedResource)> = self.inner.lock().drain(..).collect();
        for (key, resource) in drained {
            debug!(key = %key, "disposing resource");
            resource.lock().dispose();
        }
    }

    /// Snapshot of the whole pipeline state: every resource's records
    /// concatenated in insertion order.
    pub fn serialize(&self) -> Result<Vec<ResourceRecord>, ResourceError> {
        let resources: Vec<SharedResource> = self.inner.lock().values().cloned().collect();
        let mut records = Vec::new();
        for resource in resources {
            records.extend(resource.lock().serialize()?);
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
