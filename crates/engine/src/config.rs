// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline manager configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default capacity of the observer fan-out queue.
pub const DEFAULT_OBSERVER_CAPACITY: usize = 10;

/// Default bound on waiting for the worker thread at stop.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory backing the local file store.
    pub store_dir: PathBuf,
    /// Base URL embedded in serialized image records.
    pub store_url: String,
    /// Observer queue capacity; oldest messages are dropped when full.
    pub observer_capacity: usize,
    /// How long `stop` waits for the worker before abandoning it.
    pub join_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("files"),
            store_url: "http://localhost:8000".to_string(),
            observer_capacity: DEFAULT_OBSERVER_CAPACITY,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }
}
