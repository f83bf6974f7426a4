// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Camera source node.
//!
//! `prepare` enumerates the available devices into a
//! `vision.input.usb_devices.v1` resource (with one sibling per device)
//! and opens the configured device. Each tick reads one frame and rewrites
//! the node's long-lived `image.v1` resource. Read failures skip the tick;
//! the device stays open until `dispose`.

use crate::error::NodeError;
use crate::node::{Node, NodeContext};
use relay_core::resource::kinds::{image, usb_devices};
use relay_core::{Frame, PoolSize, ResourceConfig, ResourceData};
use relay_wire::NodeDescriptor;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureConfig {
    pub device_id: Option<u32>,
    /// Minimum seconds between captures; ticks inside the window are
    /// skipped without reading the device.
    #[serde(default)]
    pub interval: Option<f64>,
}

/// Produces frames for one opened device.
pub trait FrameSource: Send {
    /// One frame, `None` when the device had nothing to deliver.
    fn read(&mut self) -> Result<Option<Frame>, NodeError>;
}

/// Device discovery and opening, injectable so the engine never links a
/// concrete camera stack.
pub trait CameraBackend: Send + Sync {
    fn list_devices(&self) -> Vec<u32>;
    fn open(&self, device_id: u32) -> Result<Box<dyn FrameSource>, NodeError>;
}

/// Synthetic backend: a fixed device list delivering moving gradient
/// frames. Default backend for the built-in registry.
pub struct TestPatternCamera {
    devices: Vec<u32>,
    width: u32,
    height: u32,
}

impl Default for TestPatternCamera {
    fn default() -> Self {
        Self { devices: vec![0], width: 64, height: 48 }
    }
}

impl TestPatternCamera {
    pub fn with_devices(devices: Vec<u32>) -> Self {
        Self { devices, ..Self::default() }
    }
}

impl CameraBackend for TestPatternCamera {
    fn list_devices(&self) -> Vec<u32> {
        self.devices.clone()
    }

    fn open(&self, device_id: u32) -> Result<Box<dyn FrameSource>, NodeError> {
        if !self.devices.contains(&device_id) {
            return Err(NodeError::Device(format!("device {device_id} is not available")));
        }
        Ok(Box::new(TestPatternSource { width: self.width, height: self.height, tick: 0 }))
    }
}

struct TestPatternSource {
    width: u32,
    height: u32,
    tick: u64,
}

impl FrameSource for TestPatternSource {
    fn read(&mut self) -> Result<Option<Frame>, NodeError> {
        let shift = self.tick.wrapping_mul(4);
        let pixels = (0..u64::from(self.width * self.height))
            .map(|i| ((i + shift) % 256) as u8)
            .collect();
        self.tick += 1;
        Ok(Some(Frame::gray(self.width, self.height, pixels)))
    }
}

pub struct CaptureNode {
    ctx: NodeContext,
    id: String,
    cfg: CaptureConfig,
    backend: Arc<dyn CameraBackend>,
    source: Option<Box<dyn FrameSource>>,
    image_key: String,
    devices_key: Option<String>,
    last_capture: Option<Instant>,
    seq: u64,
}

impl CaptureNode {
    /// Built-in factory: synthetic backend.
    pub fn boxed(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Box<dyn Node>, NodeError> {
        Self::with_backend(Arc::new(TestPatternCamera::default()), ctx, descriptor)
            .map(|node| Box::new(node) as Box<dyn Node>)
    }

    pub fn with_backend(
        backend: Arc<dyn CameraBackend>,
        ctx: NodeContext,
        descriptor: NodeDescriptor,
    ) -> Result<Self, NodeError> {
        let cfg = parse_config(&descriptor)?;

        // The long-lived frame resource this node rewrites every tick.
        let image = ctx.creator.create(
            image::SCHEMA,
            ResourceConfig::new("image", vec![descriptor.id.clone()])
                .with_filename(format!("{}_image.jpg", descriptor.id)),
        )?;
        let image_key = image.lock().key().to_string();
        ctx.resources.set(&image_key, image)?;

        Ok(Self {
            ctx,
            id: descriptor.id,
            cfg,
            backend,
            source: None,
            image_key,
            devices_key: None,
            last_capture: None,
            seq: 0,
        })
    }

    fn open_source(&mut self, device_id: u32) -> bool {
        let devices = self.backend.list_devices();
        if !devices.contains(&device_id) {
            warn!(node = %self.id, device_id, available = ?devices, "device not available");
            return false;
        }
        match self.backend.open(device_id) {
            Ok(source) => {
                self.source = Some(source);
                true
            }
            Err(err) => {
                warn!(node = %self.id, device_id, error = %err, "failed to open device");
                false
            }
        }
    }
}

impl Node for CaptureNode {
    fn context(&self) -> &NodeContext {
        &self.ctx
    }

    fn prepare(&mut self) -> Result<(), NodeError> {
        // Publish the enumeration so downstream consumers and observers can
        // see what hardware exists.
        let devices = self.backend.list_devices();
        let resource = self.ctx.creator.create(
            usb_devices::SCHEMA,
            ResourceConfig::new("usb_devices", vec![self.id.clone()])
                .with_data(ResourceData::Devices(devices))
                .with_generated_siblings()
                .with_pool_size(PoolSize::Bounded(1)),
        )?;
        let key = resource.lock().key().to_string();
        self.ctx.resources.set(&key, resource)?;
        self.devices_key = Some(key);

        // Opening may fail here (device busy, permissions); the tick loop
        // retries, so this is not fatal to the start.
        if let Some(device_id) = self.cfg.device_id {
            self.open_source(device_id);
        }
        Ok(())
    }

    fn execute(&mut self) -> Result<(), NodeError> {
        let Some(device_id) = self.cfg.device_id else {
            return Err(NodeError::invalid_config(&self.id, "device_id is required"));
        };

        if let Some(interval) = self.cfg.interval.filter(|i| *i > 0.0) {
            if let Some(last) = self.last_capture {
                let since_last = self.ctx.clock.now().saturating_duration_since(last);
                if since_last < Duration::from_secs_f64(interval) {
                    return Ok(());
                }
            }
        }

        if self.source.is_none() && !self.open_source(device_id) {
            return Ok(());
        }
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };

        let frame = match source.read() {
            Ok(Some(frame)) if !frame.is_empty() => frame,
            Ok(_) => {
                warn!(node = %self.id, device_id, "no frame delivered, skipping tick");
                return Ok(());
            }
            Err(err) if err.is_transient() => {
                warn!(node = %self.id, device_id, error = %err, "frame read failed, skipping tick");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let Some(resource) = self.ctx.resources.get(&self.image_key) else {
            warn!(node = %self.id, key = %self.image_key, "image resource missing");
            return Ok(());
        };
        resource.lock().set_data(Some(ResourceData::Frame(frame)));
        self.seq += 1;
        self.last_capture = Some(self.ctx.clock.now());
        debug!(node = %self.id, seq = self.seq, "frame captured");
        Ok(())
    }

    fn dispose(&mut self) {
        self.source = None;
        if let Some(resource) = self.ctx.resources.get(&self.image_key) {
            resource.lock().dispose();
        }
        if let Some(key) = &self.devices_key {
            if let Some(resource) = self.ctx.resources.get(key) {
                resource.lock().dispose();
            }
        }
    }
}

fn parse_config(descriptor: &NodeDescriptor) -> Result<CaptureConfig, NodeError> {
    if descriptor.config.is_null() {
        return Ok(CaptureConfig::default());
    }
    serde_json::from_value(descriptor.config.clone())
        .map_err(|err| NodeError::invalid_config(&descriptor.id, err.to_string()))
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
