// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema registry: instantiate resources by schema id.

use super::base::{ResourceConfig, ResourceContext};
use super::kinds;
use super::record::ResourceRecord;
use super::SharedResource;
use crate::error::ResourceError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Construct a fresh resource from a config.
pub type ConstructFn =
    fn(ResourceContext, ResourceConfig) -> Result<SharedResource, ResourceError>;

/// Construct a fresh resource of the same kind from a serialized record.
pub type ReviveFn =
    fn(ResourceContext, &ResourceRecord) -> Result<SharedResource, ResourceError>;

struct KindEntry {
    construct: ConstructFn,
    revive: ReviveFn,
}

/// Maps schema ids to constructors and hands out context-bound instances.
pub struct ResourceCreator {
    ctx: ResourceContext,
    registry: RwLock<HashMap<String, KindEntry>>,
}

impl ResourceCreator {
    /// Empty registry; callers register kinds themselves.
    pub fn new(ctx: ResourceContext) -> Self {
        Self { ctx, registry: RwLock::new(HashMap::new()) }
    }

    /// Registry pre-loaded with every known schema.
    pub fn builtin(ctx: ResourceContext) -> Self {
        let creator = Self::new(ctx);
        creator.register(kinds::image::SCHEMA, kinds::ImageResource::shared, kinds::ImageResource::revive);
        creator.register(kinds::string::SCHEMA, kinds::StringResource::shared, kinds::StringResource::revive);
        creator.register(kinds::number::SCHEMA, kinds::NumberResource::shared, kinds::NumberResource::revive);
        creator.register(kinds::numbers::SCHEMA, kinds::NumbersResource::shared, kinds::NumbersResource::revive);
        creator.register(kinds::unknown::SCHEMA, kinds::UnknownResource::shared, kinds::UnknownResource::revive);
        creator.register(kinds::usb_device::SCHEMA, kinds::UsbDeviceResource::shared, kinds::UsbDeviceResource::revive);
        creator.register(kinds::usb_devices::SCHEMA, kinds::UsbDevicesResource::shared, kinds::UsbDevicesResource::revive);
        creator
    }

    pub fn register(&self, schema: &str, construct: ConstructFn, revive: ReviveFn) {
        self.registry
            .write()
            .insert(schema.to_string(), KindEntry { construct, revive });
    }

    /// Construct a resource of `schema` bound to this creator's context.
    pub fn create(
        &self,
        schema: &str,
        config: ResourceConfig,
    ) -> Result<SharedResource, ResourceError> {
        let registry = self.registry.read();
        let entry = registry.get(schema).ok_or_else(|| ResourceError::SchemaNotRegistered {
            schema: schema.to_string(),
        })?;
        (entry.construct)(self.ctx.clone(), config)
    }

    /// Rehydrate a resource from its serialized record, dispatching on the
    /// record's schema.
    pub fn revive(&self, record: &ResourceRecord) -> Result<SharedResource, ResourceError> {
        let registry = self.registry.read();
        let entry =
            registry.get(&record.schema).ok_or_else(|| ResourceError::SchemaNotRegistered {
                schema: record.schema.clone(),
            })?;
        (entry.revive)(self.ctx.clone(), record)
    }

    pub fn context(&self) -> &ResourceContext {
        &self.ctx
    }

    pub fn schemas(&self) -> Vec<String> {
        let mut schemas: Vec<String> = self.registry.read().keys().cloned().collect();
        schemas.sort();
        schemas
    }
}

#[cfg(test)]
#[path = "creator_tests.rs"]
mod tests;
