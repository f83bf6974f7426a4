// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binarization transform node.
//!
//! Reads the upstream frame by the stable key in its config, grayscales
//! it, applies a fixed threshold, and rewrites its own `binary_image`
//! resource. A missing or empty upstream frame skips the tick so the loop
//! survives a bad frame.

use crate::error::NodeError;
use crate::node::{Node, NodeContext};
use relay_core::resource::kinds::image;
use relay_core::{Frame, ResourceConfig, ResourceData};
use relay_wire::NodeDescriptor;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_THRESHOLD: u8 = 128;

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    /// Resource key of the upstream image, e.g. `node_a.image`.
    pub image: String,
    #[serde(default)]
    pub threshold: Option<u8>,
}

#[derive(Debug)]
pub struct ThresholdNode {
    ctx: NodeContext,
    id: String,
    cfg: ThresholdConfig,
    out_key: String,
    seq: u64,
}

impl ThresholdNode {
    pub fn boxed(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Box<dyn Node>, NodeError> {
        Self::new(ctx, descriptor).map(|node| Box::new(node) as Box<dyn Node>)
    }

    pub fn new(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Self, NodeError> {
        let cfg: ThresholdConfig = serde_json::from_value(descriptor.config.clone())
            .map_err(|err| NodeError::invalid_config(&descriptor.id, err.to_string()))?;
        if cfg.image.is_empty() {
            return Err(NodeError::invalid_config(&descriptor.id, "image reference is required"));
        }
        Ok(Self {
            ctx,
            id: descriptor.id.clone(),
            cfg,
            out_key: format!("{}.binary_image", descriptor.id),
            seq: 0,
        })
    }

    fn threshold(&self) -> u8 {
        self.cfg.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}

impl Node for ThresholdNode {
    fn context(&self) -> &NodeContext {
        &self.ctx
    }

    fn prepare(&mut self) -> Result<(), NodeError> {
        let resource = self.ctx.creator.create(
            image::SCHEMA,
            ResourceConfig::new("binary_image", vec![self.id.clone()])
                .with_filename(format!("{}_binary_image.jpg", self.id)),
        )?;
        self.ctx.resources.set(&self.out_key, resource)?;
        Ok(())
    }

    fn execute(&mut self) -> Result<(), NodeError> {
        let Some(upstream) = self.ctx.resources.get(&self.cfg.image) else {
            debug!(node = %self.id, key = %self.cfg.image, "upstream image not present yet");
            return Ok(());
        };
        let Some(frame) = upstream.lock().get_data(None) else {
            return Ok(());
        };
        let Some(frame) = frame.as_frame().filter(|frame| !frame.is_empty()) else {
            return Ok(());
        };

        let binary = binarize(&to_gray(frame), self.threshold());

        let Some(out) = self.ctx.resources.get(&self.out_key) else {
            debug!(node = %self.id, key = %self.out_key, "output resource missing");
            return Ok(());
        };
        out.lock().set_data(Some(ResourceData::Frame(binary)));
        self.seq += 1;
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(resource) = self.ctx.resources.get(&self.out_key) {
            resource.lock().dispose();
        }
    }
}

/// Luma conversion with integer BT.601 weights.
pub fn to_gray(frame: &Frame) -> Frame {
    if frame.channels == 1 {
        return frame.clone();
    }
    let pixels = frame
        .pixels
        .chunks_exact(3)
        .map(|rgb| {
            let luma = 299 * u32::from(rgb[0]) + 587 * u32::from(rgb[1]) + 114 * u32::from(rgb[2]);
            (luma / 1000) as u8
        })
        .collect();
    Frame::gray(frame.width, frame.height, pixels)
}

/// Every pixel at or above `threshold` becomes white, the rest black.
pub fn binarize(gray: &Frame, threshold: u8) -> Frame {
    let pixels = gray
        .pixels
        .iter()
        .map(|&pixel| if pixel >= threshold { 255 } else { 0 })
        .collect();
    Frame::gray(gray.width, gray.height, pixels)
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
