// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node kind registry.
//!
//! Maps user-visible kind names to compiled-in node factories. Plugin
//! manifests add aliases onto factories resolved by class name; the engine
//! itself only ever asks "given a kind name, build me a node".

use crate::error::{NodeError, PipelineError};
use crate::node::{Node, NodeContext};
use crate::nodes;
use relay_wire::NodeDescriptor;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a node instance from a context and its descriptor.
pub type NodeFactory =
    Arc<dyn Fn(NodeContext, NodeDescriptor) -> Result<Box<dyn Node>, NodeError> + Send + Sync>;

#[derive(Clone)]
struct RegisteredKind {
    class_name: String,
    factory: NodeFactory,
}

/// Kind name → node constructor.
#[derive(Clone, Default)]
pub struct NodeRegistry {
    kinds: HashMap<String, RegisteredKind>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the built-in node kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("camera", "CaptureNode", nodes::CaptureNode::boxed);
        registry.register("threshold", "ThresholdNode", nodes::ThresholdNode::boxed);
        registry.register("cast", "CastNode", nodes::CastNode::boxed);
        registry.register("branch", "BranchNode", nodes::BranchNode::boxed);
        registry
    }

    pub fn register<F>(&mut self, name: &str, class_name: &str, factory: F)
    where
        F: Fn(NodeContext, NodeDescriptor) -> Result<Box<dyn Node>, NodeError>
            + Send
            + Sync
            + 'static,
    {
        self.kinds.insert(
            name.to_string(),
            RegisteredKind { class_name: class_name.to_string(), factory: Arc::new(factory) },
        );
    }

    /// Register `name` as another door to the factory whose declared class
    /// name matches `class_name` (plugin manifest resolution).
    pub fn alias(&mut self, name: &str, class_name: &str) -> Result<(), PipelineError> {
        let found = self
            .kinds
            .values()
            .find(|kind| kind.class_name == class_name)
            .cloned()
            .ok_or_else(|| {
                PipelineError::Manifest(format!("no registered node class {class_name}"))
            })?;
        self.kinds.insert(name.to_string(), found);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn kinds(&self) -> Vec<String> {
        let mut names: Vec<String> = self.kinds.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct a node for `descriptor` with the given context.
    pub fn build(
        &self,
        ctx: NodeContext,
        descriptor: NodeDescriptor,
    ) -> Result<Box<dyn Node>, PipelineError> {
        let kind = self
            .kinds
            .get(&descriptor.name)
            .ok_or_else(|| PipelineError::UnknownNodeKind(descriptor.name.clone()))?;
        let id = descriptor.id.clone();
        (kind.factory)(ctx, descriptor)
            .map_err(|source| PipelineError::Construct { id, source })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
