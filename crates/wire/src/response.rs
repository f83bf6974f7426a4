// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline lifecycle state as seen by the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Running => "running",
            PipelineStatus::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Acknowledgement for a control operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
    pub status: PipelineStatus,
}

impl Ack {
    pub fn new(message: impl Into<String>, status: PipelineStatus) -> Self {
        Self { message: message.into(), status }
    }
}

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: PipelineStatus,
    pub has_config: bool,
    pub config_length: usize,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
