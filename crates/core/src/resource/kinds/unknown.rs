// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `unknown.v1` — opaque resource with a caller-supplied rendering.
//!
//! The engine cannot know how to serialize an arbitrary payload, so the
//! config must carry a serialize function; without one `serialize` fails.

use crate::error::ResourceError;
use crate::resource::base::{ResourceBase, ResourceConfig, ResourceContext, SerializeFn};
use crate::resource::data::ResourceData;
use crate::resource::record::ResourceRecord;
use crate::resource::{Resource, SharedResource};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

pub const SCHEMA: &str = "unknown.v1";

pub struct UnknownResource {
    base: ResourceBase,
    serialize_with: Option<SerializeFn>,
}

impl UnknownResource {
    pub fn new(ctx: ResourceContext, config: ResourceConfig) -> Result<Self, ResourceError> {
        let serialize_with = config.serialize_with.clone();
        Ok(Self { base: ResourceBase::new(ctx, &config)?, serialize_with })
    }

    pub fn shared(
        ctx: ResourceContext,
        config: ResourceConfig,
    ) -> Result<SharedResource, ResourceError> {
        Ok(Arc::new(Mutex::new(Self::new(ctx, config)?)))
    }

    /// Revived resources get an identity rendering so a revived record can
    /// be serialized again.
    pub fn revive(
        ctx: ResourceContext,
        record: &ResourceRecord,
    ) -> Result<SharedResource, ResourceError> {
        let mut config = ResourceConfig::new(&record.name, record.scopes.clone())
            .with_serialize_fn(Arc::new(|data: &ResourceData| {
                data.to_json().unwrap_or(Value::Null)
            }));
        config.data = ResourceData::from_json(&record.data);
        Self::shared(ctx, config)
    }
}

impl Resource for UnknownResource {
    fn schema(&self) -> &'static str {
        SCHEMA
    }

    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }

    fn serialize(&self) -> Result<Vec<ResourceRecord>, ResourceError> {
        let serialize_with =
            self.serialize_with.as_ref().ok_or_else(|| ResourceError::Serialize {
                key: self.base.key().to_string(),
                reason: "serialize fn is not set".to_string(),
            })?;
        let data = self
            .base
            .latest()
            .and_then(|item| item.data.as_ref())
            .map(|data| serialize_with(data))
            .unwrap_or(Value::Null);
        Ok(self.base.record_with(SCHEMA, data).into_iter().collect())
    }
}

#[cfg(test)]
#[path = "unknown_tests.rs"]
mod tests;
