// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine errors

use relay_core::ResourceError;
use relay_wire::PipelineStatus;
use thiserror::Error;

/// Errors raised by node construction, preparation, and execution.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Missing or mis-typed required field in a node's config.
    #[error("invalid config for node {node}: {reason}")]
    InvalidConfig { node: String, reason: String },

    /// A required resource key was not present.
    #[error("resource {key} not found")]
    NotFound { key: String },

    #[error("device error: {0}")]
    Device(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl NodeError {
    pub fn invalid_config(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig { node: node.into(), reason: reason.into() }
    }

    /// The transient-io class: logged and swallowed inside nodes, the
    /// tick is skipped and the loop continues. Config and resource-layer
    /// errors are not recoverable by retrying the tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, NodeError::NotFound { .. } | NodeError::Device(_))
    }
}

/// Errors surfaced to the control API.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// State-machine violation, e.g. `set_config` while running.
    #[error("invalid state: cannot {op} while {status}")]
    InvalidState { op: &'static str, status: PipelineStatus },

    #[error("no pipeline configured")]
    NoConfig,

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("unknown node kind: {0}")]
    UnknownNodeKind(String),

    #[error("plugin manifest error: {0}")]
    Manifest(String),

    #[error("node {id} failed to construct: {source}")]
    Construct {
        id: String,
        #[source]
        source: NodeError,
    },

    #[error("node {id} failed to prepare: {source}")]
    Prepare {
        id: String,
        #[source]
        source: NodeError,
    },

    #[error("failed to spawn pipeline worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Why an observer was dropped from the active set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObserverError {
    #[error("observer channel closed")]
    Closed,

    #[error("observer send timed out")]
    Timeout,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
