// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource-layer errors

use crate::store::StoreError;
use thiserror::Error;

/// Errors from resource construction, lookup, and serialization.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Missing or mis-typed required field at construction.
    #[error("invalid resource config: {reason}")]
    InvalidConfig { reason: String },

    /// Schema id has no registered constructor.
    #[error("resource kind for schema {schema} not registered")]
    SchemaNotRegistered { schema: String },

    /// Instance map binding disagrees with the resource's own key.
    #[error("key mismatch: cannot bind {bound} to resource with key {actual}")]
    KeyMismatch { bound: String, actual: String },

    #[error("serialize failed for {key}: {reason}")]
    Serialize { key: String, reason: String },

    /// A serialized record could not be turned back into a live resource.
    #[error("cannot revive {schema} record: {reason}")]
    Revive { schema: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResourceError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig { reason: reason.into() }
    }
}
