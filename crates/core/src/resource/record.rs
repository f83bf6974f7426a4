// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialized shapes: data items, change tokens, resource records.

use super::data::ResourceData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One historical value of a resource. Created only by `set_data`,
/// immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    pub data: Option<ResourceData>,
    pub version: u64,
    pub timestamp: DateTime<Utc>,
}

/// Lightweight change notification: key + version + timestamp, no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataToken {
    pub key: String,
    pub version: u64,
    /// RFC 3339 rendering of the item timestamp.
    pub timestamp: String,
}

/// The authoritative serialized record for one resource.
///
/// Collection resources emit their own record immediately before their
/// siblings' records. `data` is kind-dependent: primitives carry the value,
/// images carry a versioned store URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub key: String,
    pub schema: String,
    pub name: String,
    pub scopes: Vec<String>,
    pub version: u64,
    /// RFC 3339.
    pub timestamp: String,
    pub data: Value,
}
