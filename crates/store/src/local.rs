// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed file store.
//!
//! Local fast path: bytes go straight to disk, no HTTP roundtrip. The
//! configured base URL only shapes the download URLs handed to consumers.

use relay_core::{Deleted, FileStore, StoreError, Uploaded};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct LocalStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self { dir: dir.into(), base_url: base_url.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl FileStore for LocalStore {
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<Uploaded, StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(name), bytes)?;
        debug!(name = %name, size = bytes.len(), "file uploaded");
        Ok(Uploaded { filename: name.to_string() })
    }

    fn download(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(StoreError::NotFound { name: name.to_string() });
        }
        Ok(fs::read(path)?)
    }

    fn delete(&self, name: &str) -> Result<Deleted, StoreError> {
        let path = self.dir.join(name);
        if path.exists() {
            fs::remove_file(path)?;
            return Ok(Deleted { message: "File deleted".to_string() });
        }
        Ok(Deleted { message: "File not found".to_string() })
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/file/{name}", self.base_url)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
