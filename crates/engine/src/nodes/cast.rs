// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative cast node.
//!
//! Applies an enumerated transform to a source resource's latest data and
//! publishes the result under its own scope. The transform table replaces
//! the reference design's compile-and-run-user-code surface: every
//! transform is a typed, named operation.

use crate::error::NodeError;
use crate::node::{Node, NodeContext};
use relay_core::{ResourceConfig, ResourceData};
use relay_wire::NodeDescriptor;
use serde::Deserialize;
use tracing::debug;

/// The supported transforms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CastOp {
    /// Render any primitive as text.
    ToText,
    /// Round a number to the nearest integer.
    Round,
    /// Multiply a number by a constant factor.
    Scale { factor: f64 },
    /// Element count of a list, character count of text.
    Count,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastConfig {
    /// Resource key of the source, e.g. `node_b.result`.
    pub source: String,
    /// Name of the published result resource.
    pub name: String,
    /// Schema of the published result: `string.v1` or `number.v1`.
    pub target_schema: String,
    pub transform: CastOp,
}

#[derive(Debug)]
pub struct CastNode {
    ctx: NodeContext,
    id: String,
    cfg: CastConfig,
    out_key: String,
}

impl CastNode {
    pub fn boxed(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Box<dyn Node>, NodeError> {
        Self::new(ctx, descriptor).map(|node| Box::new(node) as Box<dyn Node>)
    }

    pub fn new(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Self, NodeError> {
        let cfg: CastConfig = serde_json::from_value(descriptor.config.clone())
            .map_err(|err| NodeError::invalid_config(&descriptor.id, err.to_string()))?;
        if cfg.target_schema != "string.v1" && cfg.target_schema != "number.v1" {
            return Err(NodeError::invalid_config(
                &descriptor.id,
                format!("unsupported target schema {}", cfg.target_schema),
            ));
        }
        let out_key = format!("{}.{}", descriptor.id, cfg.name);
        Ok(Self { ctx, id: descriptor.id, cfg, out_key })
    }
}

impl Node for CastNode {
    fn context(&self) -> &NodeContext {
        &self.ctx
    }

    fn prepare(&mut self) -> Result<(), NodeError> {
        let resource = self.ctx.creator.create(
            &self.cfg.target_schema,
            ResourceConfig::new(self.cfg.name.clone(), vec![self.id.clone()]),
        )?;
        self.ctx.resources.set(&self.out_key, resource)?;
        Ok(())
    }

    fn execute(&mut self) -> Result<(), NodeError> {
        let Some(source) = self.ctx.resources.get(&self.cfg.source) else {
            debug!(node = %self.id, key = %self.cfg.source, "source not present yet");
            return Ok(());
        };
        let data = source.lock().get_data(None);
        let casted = data.as_ref().and_then(|data| apply(&self.cfg.transform, data));
        if casted.is_none() && data.is_some() {
            debug!(node = %self.id, "transform not applicable to source data, skipping tick");
            return Ok(());
        }

        let Some(out) = self.ctx.resources.get(&self.out_key) else {
            return Ok(());
        };
        out.lock().set_data(casted);
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(resource) = self.ctx.resources.get(&self.out_key) {
            resource.lock().dispose();
        }
    }
}

/// `None` when the transform does not apply to the payload's type.
pub fn apply(op: &CastOp, data: &ResourceData) -> Option<ResourceData> {
    match op {
        CastOp::ToText => {
            let text = match data {
                ResourceData::Text(s) => s.clone(),
                ResourceData::Number(n) => n.to_string(),
                ResourceData::Device(id) => id.to_string(),
                ResourceData::Numbers(_) | ResourceData::Devices(_) | ResourceData::Json(_) => {
                    data.to_json()?.to_string()
                }
                ResourceData::Frame(_) => return None,
            };
            Some(ResourceData::Text(text))
        }
        CastOp::Round => data.as_number().map(|n| ResourceData::Number(n.round())),
        CastOp::Scale { factor } => data.as_number().map(|n| ResourceData::Number(n * factor)),
        CastOp::Count => {
            let count = match data {
                ResourceData::Numbers(ns) => ns.len(),
                ResourceData::Devices(ids) => ids.len(),
                ResourceData::Text(s) => s.chars().count(),
                _ => return None,
            };
            Some(ResourceData::Number(count as f64))
        }
    }
}

#[cfg(test)]
#[path = "cast_tests.rs"]
mod tests;
