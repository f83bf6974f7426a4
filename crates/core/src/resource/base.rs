// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared resource state: key derivation, version counter, bounded pool.

use super::data::ResourceData;
use super::record::{DataItem, DataToken, ResourceRecord};
use super::SharedResource;
use crate::clock::Clock;
use crate::error::ResourceError;
use crate::event::{EventDispatcher, EventPayload, RESOURCE_UPDATED};
use crate::store::FileStore;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Default number of historical items kept per resource.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Pool bound. `Unbounded` keeps every item; `Bounded(n)` evicts the oldest
/// entry once `n` items are pooled. `Bounded(0)` is rejected at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolSize {
    Bounded(usize),
    Unbounded,
}

impl Default for PoolSize {
    fn default() -> Self {
        PoolSize::Bounded(DEFAULT_POOL_SIZE)
    }
}

/// Context every resource is constructed with: where update notifications
/// go, how items are timestamped, and where binary payloads are stored.
#[derive(Clone)]
pub struct ResourceContext {
    pub events: Arc<EventDispatcher>,
    pub clock: Arc<dyn Clock>,
    pub store: Arc<dyn FileStore>,
}

/// Custom rendering for `unknown.v1` payloads.
pub type SerializeFn = Arc<dyn Fn(&ResourceData) -> Value + Send + Sync>;

/// Construction config for a resource.
///
/// `name` and `scopes` are required and must be non-empty; everything else
/// has kind-dependent meaning and defaults.
#[derive(Clone, Default)]
pub struct ResourceConfig {
    pub name: String,
    pub scopes: Vec<String>,
    pub data: Option<ResourceData>,
    pub pool_size: PoolSize,
    /// Stable store filename, image kind only.
    pub filename: Option<String>,
    /// Collection kinds: create one child resource per element.
    pub generate_siblings: bool,
    /// `unknown.v1` only.
    pub serialize_with: Option<SerializeFn>,
}

impl fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("name", &self.name)
            .field("scopes", &self.scopes)
            .field("data", &self.data)
            .field("pool_size", &self.pool_size)
            .field("filename", &self.filename)
            .field("generate_siblings", &self.generate_siblings)
            .field("serialize_with", &self.serialize_with.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl ResourceConfig {
    pub fn new(name: impl Into<String>, scopes: Vec<String>) -> Self {
        Self { name: name.into(), scopes, ..Self::default() }
    }

    pub fn with_data(mut self, data: ResourceData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_pool_size(mut self, pool_size: PoolSize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_generated_siblings(mut self) -> Self {
        self.generate_siblings = true;
        self
    }

    pub fn with_serialize_fn(mut self, serialize_with: SerializeFn) -> Self {
        self.serialize_with = Some(serialize_with);
        self
    }
}

/// The state every resource kind embeds.
///
/// Owns the pool, the version counter, and the sibling list. The derived
/// key `join(scopes, ".") + "." + name` is immutable for the resource's
/// lifetime.
pub struct ResourceBase {
    ctx: ResourceContext,
    key: String,
    name: String,
    scopes: Vec<String>,
    pool: VecDeque<DataItem>,
    pool_size: PoolSize,
    version: u64,
    siblings: Vec<SharedResource>,
}

impl fmt::Debug for ResourceBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBase")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("scopes", &self.scopes)
            .field("pool", &self.pool)
            .field("pool_size", &self.pool_size)
            .field("version", &self.version)
            .field("siblings", &self.siblings.len())
            .finish()
    }
}

impl ResourceBase {
    /// Validates the config, derives the key, and appends the initial item
    /// (which fires the first `resource_updated`, also for `data = None`).
    pub fn new(ctx: ResourceContext, config: &ResourceConfig) -> Result<Self, ResourceError> {
        if config.name.is_empty() {
            return Err(ResourceError::invalid_config("name must be a non-empty string"));
        }
        if config.scopes.is_empty() {
            return Err(ResourceError::invalid_config("scopes must be a non-empty sequence"));
        }
        if config.pool_size == PoolSize::Bounded(0) {
            return Err(ResourceError::invalid_config("pool_size 0 would never retain an item"));
        }

        let key = format!("{}.{}", config.scopes.join("."), config.name);
        let mut base = Self {
            ctx,
            key,
            name: config.name.clone(),
            scopes: config.scopes.clone(),
            pool: VecDeque::new(),
            pool_size: config.pool_size,
            version: 0,
            siblings: Vec::new(),
        };
        base.push(config.data.clone());
        Ok(base)
    }

    /// Append a new item: bump the version, evict the oldest entry if the
    /// pool is full, stamp, notify.
    pub fn push(&mut self, data: Option<ResourceData>) -> DataItem {
        self.version += 1;
        if let PoolSize::Bounded(limit) = self.pool_size {
            if self.pool.len() >= limit {
                self.pool.pop_front();
            }
        }
        let item = DataItem {
            data,
            version: self.version,
            timestamp: self.ctx.clock.now_utc(),
        };
        self.pool.push_back(item.clone());
        let token = DataToken {
            key: self.key.clone(),
            version: item.version,
            timestamp: item.timestamp.to_rfc3339(),
        };
        self.ctx.events.emit(RESOURCE_UPDATED, EventPayload::Token(token));
        item
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Latest appended version; 0 only before the initial item exists.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Versions currently held in the pool, oldest first.
    pub fn pooled_versions(&self) -> Vec<u64> {
        self.pool.iter().map(|item| item.version).collect()
    }

    pub fn latest(&self) -> Option<&DataItem> {
        self.pool.back()
    }

    /// The item holding `version`, or the latest when `None`.
    pub fn item(&self, version: Option<u64>) -> Option<&DataItem> {
        match version {
            None => self.latest(),
            Some(v) => self.pool.iter().find(|item| item.version == v),
        }
    }

    pub fn latest_token(&self) -> Option<DataToken> {
        self.latest().map(|item| DataToken {
            key: self.key.clone(),
            version: item.version,
            timestamp: item.timestamp.to_rfc3339(),
        })
    }

    pub fn context(&self) -> &ResourceContext {
        &self.ctx
    }

    pub fn siblings(&self) -> &[SharedResource] {
        &self.siblings
    }

    pub fn add_sibling(&mut self, sibling: SharedResource) {
        self.siblings.push(sibling);
    }

    /// Drop siblings beyond `len`, disposing each removed one.
    pub fn truncate_siblings(&mut self, len: usize) {
        while self.siblings.len() > len {
            if let Some(sibling) = self.siblings.pop() {
                sibling.lock().dispose();
            }
        }
    }

    pub fn dispose_siblings(&mut self) {
        self.truncate_siblings(0);
    }

    /// Scope chain for children of this resource: own scopes plus own name.
    pub fn child_scopes(&self) -> Vec<String> {
        let mut scopes = self.scopes.clone();
        scopes.push(self.name.clone());
        scopes
    }

    /// Record for the latest item with an explicit `data` rendering.
    pub fn record_with(&self, schema: &str, data: Value) -> Option<ResourceRecord> {
        self.latest().map(|item| ResourceRecord {
            key: self.key.clone(),
            schema: schema.to_string(),
            name: self.name.clone(),
            scopes: self.scopes.clone(),
            version: item.version,
            timestamp: item.timestamp.to_rfc3339(),
            data,
        })
    }

    /// Record for the latest item using the payload's own JSON form.
    /// Payloads without one (frames) render as `null`.
    pub fn record(&self, schema: &str) -> Option<ResourceRecord> {
        let data = self
            .latest()
            .and_then(|item| item.data.as_ref())
            .and_then(ResourceData::to_json)
            .unwrap_or(Value::Null);
        self.record_with(schema, data)
    }
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
