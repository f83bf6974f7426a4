// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vision.input.usb_devices.v1` — collection of enumerated capture
//! devices, one `vision.input.usb_device.v1` sibling per device id.

use super::usb_device::UsbDeviceResource;
use crate::error::ResourceError;
use crate::resource::base::{ResourceBase, ResourceConfig, ResourceContext};
use crate::resource::data::ResourceData;
use crate::resource::record::{DataItem, ResourceRecord};
use crate::resource::{Resource, SharedResource};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

pub const SCHEMA: &str = "vision.input.usb_devices.v1";

pub struct UsbDevicesResource {
    base: ResourceBase,
    generate_siblings: bool,
}

impl UsbDevicesResource {
    pub fn new(ctx: ResourceContext, config: ResourceConfig) -> Result<Self, ResourceError> {
        if config
            .data
            .as_ref()
            .is_some_and(|data| data.as_devices().is_none())
        {
            return Err(ResourceError::invalid_config(
                "vision.input.usb_devices.v1 data must be a device id list",
            ));
        }
        let generate_siblings = config.generate_siblings;
        let mut resource = Self { base: ResourceBase::new(ctx, &config)?, generate_siblings };
        if generate_siblings {
            if let Some(ResourceData::Devices(ids)) = config.data {
                resource.reconcile(&ids);
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

    pub fn revive(
        ctx: ResourceContext,
        record: &ResourceRecord,
    ) -> Result<SharedResource, ResourceError> {
        let ids: Option<Vec<u32>> = record
            .data
            .as_array()
            .map(|items| items.iter().filter_map(|v| v.as_u64().map(|id| id as u32)).collect());
        let mut config =
            ResourceConfig::new(&record.name, record.scopes.clone()).with_generated_siblings();
        config.data = ids.map(ResourceData::Devices);
        Self::shared(ctx, config)
    }

    /// Existing siblings are updated positionally; appended device ids get
    /// fresh siblings named after the id.
    fn reconcile(&mut self, ids: &[u32]) {
        self.base.truncate_siblings(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            if idx < self.base.siblings().len() {
                self.base.siblings()[idx]
                    .lock()
                    .set_data(Some(ResourceData::Device(*id)));
                continue;
            }
            let config = ResourceConfig::new(format!("usb_device_{id}"), self.base.child_scopes())
                .with_data(ResourceData::Device(*id));
            match UsbDeviceResource::shared(self.base.context().clone(), config) {
                Ok(sibling) => self.base.add_sibling(sibling),
                Err(err) => warn!(key = %self.base.key(), error = %err, "sibling creation failed"),
            }
        }
    }
}

impl Resource for UsbDevicesResource {
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
            if let Some(ResourceData::Devices(ids)) = item.data.clone() {
                self.reconcile(&ids);
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
#[path = "usb_devices_tests.rs"]
mod tests;
