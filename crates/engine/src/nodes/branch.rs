// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional routing node.
//!
//! Each tick draws a random index into its route table, publishes the
//! drawn value as a `number.v1` result, and overrides `next` to start the
//! chosen node instead of the default chain.

use crate::error::NodeError;
use crate::node::{Node, NodeContext};
use rand::Rng;
use relay_core::{ResourceConfig, ResourceData};
use relay_wire::NodeDescriptor;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BranchConfig {
    /// Candidate node indices; one is drawn uniformly each tick.
    pub routes: Vec<usize>,
}

#[derive(Debug)]
pub struct BranchNode {
    ctx: NodeContext,
    id: String,
    cfg: BranchConfig,
    result_key: String,
    chosen: Option<usize>,
}

impl BranchNode {
    pub fn boxed(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Box<dyn Node>, NodeError> {
        Self::new(ctx, descriptor).map(|node| Box::new(node) as Box<dyn Node>)
    }

    pub fn new(ctx: NodeContext, descriptor: NodeDescriptor) -> Result<Self, NodeError> {
        let cfg: BranchConfig = serde_json::from_value(descriptor.config.clone())
            .map_err(|err| NodeError::invalid_config(&descriptor.id, err.to_string()))?;
        if cfg.routes.is_empty() {
            return Err(NodeError::invalid_config(&descriptor.id, "routes must not be empty"));
        }
        let result_key = format!("{}.result", descriptor.id);
        Ok(Self { ctx, id: descriptor.id, cfg, result_key, chosen: None })
    }

    /// Target picked by the last execute, if any.
    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }
}

impl Node for BranchNode {
    fn context(&self) -> &NodeContext {
        &self.ctx
    }

    fn prepare(&mut self) -> Result<(), NodeError> {
        let resource = self.ctx.creator.create(
            "number.v1",
            ResourceConfig::new("result", vec![self.id.clone()]),
        )?;
        self.ctx.resources.set(&self.result_key, resource)?;
        Ok(())
    }

    fn execute(&mut self) -> Result<(), NodeError> {
        let pick = rand::thread_rng().gen_range(0..self.cfg.routes.len());
        self.chosen = Some(self.cfg.routes[pick]);

        if let Some(resource) = self.ctx.resources.get(&self.result_key) {
            resource.lock().set_data(Some(ResourceData::Number(pick as f64)));
        }
        Ok(())
    }

    fn next(&mut self) {
        match self.chosen {
            Some(target) => self.ctx.emit_start(target),
            None => self.ctx.emit_next(),
        }
    }

    fn dispose(&mut self) {
        if let Some(resource) = self.ctx.resources.get(&self.result_key) {
            resource.lock().dispose();
        }
    }
}

#[cfg(test)]
#[path = "branch_tests.rs"]
mod tests;
