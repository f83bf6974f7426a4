// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer stream messages.
//!
//! Serializes with `{"type": "node_complete", ...fields}` format. The
//! stream is lossy by design; observers reconcile with resource versions.

use relay_core::ResourceRecord;
use serde::{Deserialize, Serialize};

/// Image reference extracted from a snapshot for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub key: String,
    pub name: String,
    pub url: String,
}

/// One message on the observer stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamMessage {
    #[serde(rename = "pipeline_start")]
    PipelineStart {
        message: String,
        node_count: usize,
        timestamp: String,
    },

    #[serde(rename = "node_start")]
    NodeStart {
        node_index: usize,
        node_id: String,
        node_name: String,
        timestamp: String,
    },

    /// Completion of one tick, with the full resource snapshot.
    #[serde(rename = "node_complete")]
    NodeComplete {
        node_index: usize,
        node_id: String,
        node_name: String,
        resources: Vec<ResourceRecord>,
        image_urls: Vec<ImageUrl>,
        timestamp: String,
    },

    #[serde(rename = "node_error")]
    NodeError {
        node_index: usize,
        node_id: String,
        node_name: String,
        error: String,
        timestamp: String,
    },

    /// The tail node finished; the loop wraps back to node 0.
    #[serde(rename = "cycle_complete")]
    CycleComplete { message: String, timestamp: String },

    #[serde(rename = "pipeline_stop")]
    PipelineStop { message: String, timestamp: String },

    #[serde(rename = "pipeline_error")]
    PipelineError { error: String, timestamp: String },
}

impl StreamMessage {
    /// Wire name of this message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamMessage::PipelineStart { .. } => "pipeline_start",
            StreamMessage::NodeStart { .. } => "node_start",
            StreamMessage::NodeComplete { .. } => "node_complete",
            StreamMessage::NodeError { .. } => "node_error",
            StreamMessage::CycleComplete { .. } => "cycle_complete",
            StreamMessage::PipelineStop { .. } => "pipeline_stop",
            StreamMessage::PipelineError { .. } => "pipeline_error",
        }
    }
}

/// Extract `{key, name, url}` for every snapshot record whose schema is
/// `image.v1` and whose data is a URL.
pub fn image_urls(records: &[ResourceRecord]) -> Vec<ImageUrl> {
    records
        .iter()
        .filter(|record| record.schema == "image.v1")
        .filter_map(|record| {
            record.data.as_str().map(|url| ImageUrl {
                key: record.key.clone(),
                name: record.name.clone(),
                url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
