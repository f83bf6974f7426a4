// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of a submitted pipeline: which node kind to run, under which
/// id, with which node-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Unique within a pipeline; becomes the resource scope for the node's
    /// outputs.
    pub id: String,
    /// Plugin kind name resolved through the node registry.
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Node-specific parameters, interpreted by the node itself.
    #[serde(default)]
    pub config: Value,
}

impl NodeDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: String::new(),
            config: Value::Null,
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}
