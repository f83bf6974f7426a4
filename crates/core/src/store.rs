// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File store interface.
//!
//! The engine never talks to a concrete store; resources and nodes hold an
//! `Arc<dyn FileStore>` from their context. Implementations live in
//! `relay-store`. Downloads are addressed by the stable URL form
//! `{store_url}/file/{name}`, which is also what serialized image records
//! embed.

use thiserror::Error;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    pub filename: String,
}

/// Result of a delete. `message` distinguishes "deleted" from
/// "was not there", both of which are success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub message: String,
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file {name} not found")]
    NotFound { name: String },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named byte store with stable download URLs.
pub trait FileStore: Send + Sync {
    /// Write `bytes` under `name`, overwriting any previous content.
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<Uploaded, StoreError>;

    fn download(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove `name`. Deleting a missing file is not an error.
    fn delete(&self, name: &str) -> Result<Deleted, StoreError>;

    /// The stable download URL for `name`: `{store_url}/file/{name}`.
    fn file_url(&self, name: &str) -> String;
}
