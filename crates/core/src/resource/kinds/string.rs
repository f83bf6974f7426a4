// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `string.v1` — primitive text resource.

use crate::error::ResourceError;
use crate::resource::base::{ResourceBase, ResourceConfig, ResourceContext};
use crate::resource::data::ResourceData;
use crate::resource::record::ResourceRecord;
use crate::resource::{Resource, SharedResource};
use parking_lot::Mutex;
use std::sync::Arc;

pub const SCHEMA: &str = "string.v1";

pub struct StringResource {
    base: ResourceBase,
}

impl StringResource {
    pub fn new(ctx: ResourceContext, config: ResourceConfig) -> Result<Self, ResourceError> {
        Ok(Self { base: ResourceBase::new(ctx, &config)? })
    }

    pub fn shared(
        ctx: ResourceContext,
        config: ResourceConfig,
    ) -> Result<SharedResource, ResourceError> {
        Ok(Arc::new(Mutex::new(Self::new(ctx, config)?)))
    }

    /// Construct a fresh resource of this kind from a serialized record.
    pub fn revive(
        ctx: ResourceContext,
        record: &ResourceRecord,
    ) -> Result<SharedResource, ResourceError> {
        let mut config = ResourceConfig::new(&record.name, record.scopes.clone());
        config.data = ResourceData::from_json(&record.data);
        Self::shared(ctx, config)
    }
}

impl Resource for StringResource {
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
        Ok(self.base.record(SCHEMA).into_iter().collect())
    }
}

#[cfg(test)]
#[path = "string_tests.rs"]
mod tests;
