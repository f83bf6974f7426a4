// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::NodeDescriptor;
use serde::{Deserialize, Serialize};

/// Control request for a pipeline manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Replace the stored pipeline configuration. Rejected while running.
    #[serde(rename = "set_config")]
    SetConfig { pipeline: Vec<NodeDescriptor> },

    /// Build, prepare, and run the configured pipeline.
    #[serde(rename = "start")]
    Start,

    /// Raise the stop flag and tear down. Idempotent.
    #[serde(rename = "stop")]
    Stop,

    #[serde(rename = "status")]
    Status,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
