// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `numbers.v1` — collection of `number.v1` elements.
//!
//! With `generate_siblings` the resource owns one child `number.v1` per
//! element. On every `set_data` the sibling list is reconciled to the new
//! element count: existing children are updated in place, extras are
//! disposed and dropped, and new children are appended.

use super::number::NumberResource;
use crate::error::ResourceError;
use crate::resource::base::{ResourceBase, ResourceConfig, ResourceContext};
use crate::resource::data::ResourceData;
use crate::resource::record::{DataItem, ResourceRecord};
use crate::resource::{Resource, SharedResource};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

pub const SCHEMA: &str = "numbers.v1";

#[derive(Debug)]
pub struct NumbersResource {
    base: ResourceBase,
    generate_siblings: bool,
}

impl NumbersResource {
    pub fn new(ctx: ResourceContext, config: ResourceConfig) -> Result<Self, ResourceError> {
        if config
            .data
            .as_ref()
            .is_some_and(|data| data.as_numbers().is_none())
        {
            return Err(ResourceError::invalid_config("numbers.v1 data must be a number list"));
        }
        let generate_siblings = config.generate_siblings;
        let mut resource = Self { base: ResourceBase::new(ctx, &config)?, generate_siblings };
        if generate_siblings {
            if let Some(ResourceData::Numbers(values)) = config.data {
                resource.reconcile(&values);
            }
        }
        Ok(resource)
    }

    pub fn shared(
        ctx: ResourceContext,
        config: ResourceConfig,
    ) -> Result<SharedResource, ResourceError> {
        Ok(Arc::new(Mutex::new(Self::new(ctx, config)?)))
    }

    /// Siblings are re-created eagerly so a revived collection is
    /// indistinguishable from a freshly constructed one.
    pub fn revive(
        ctx: ResourceContext,
        record: &ResourceRecord,
    ) -> Result<SharedResource, ResourceError> {
        let mut config =
            ResourceConfig::new(&record.name, record.scopes.clone()).with_generated_siblings();
        config.data = ResourceData::from_json(&record.data);
        Self::shared(ctx, config)
    }

    fn reconcile(&mut self, values: &[f64]) {
        self.base.truncate_siblings(values.len());
        for (idx, value) in values.iter().enumerate() {
            if idx < self.base.siblings().len() {
                self.base.siblings()[idx]
                    .lock()
                    .set_data(Some(ResourceData::Number(*value)));
                continue;
            }
            let config = ResourceConfig::new(format!("number_{idx}"), self.base.child_scopes())
                .with_data(ResourceData::Number(*value));
            match NumberResource::shared(self.base.context().clone(), config) {
                Ok(sibling) => self.base.add_sibling(sibling),
                Err(err) => warn!(key = %self.base.key(), error = %err, "sibling creation failed"),
            }
        }
    }
}

impl Resource for NumbersResource {
    fn schema(&self) -> &'static str {
        SCHEMA
    }

    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }

    fn set_data(&mut self, data: Option<ResourceData>) -> DataItem {
        let item = self.base.push(data);
        if self.generate_siblings {
            if let Some(ResourceData::Numbers(values)) = item.data.clone() {
                self.reconcile(&values);
            }
        }
        item
    }

    fn serialize(&self) -> Result<Vec<ResourceRecord>, ResourceError> {
        let mut records: Vec<ResourceRecord> = self.base.record(SCHEMA).into_iter().collect();
        for sibling in self.base.siblings() {
            records.extend(sibling.lock().serialize()?);
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "numbers_tests.rs"]
mod tests;
