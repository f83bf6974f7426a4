// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers shared by this crate's tests and, via the `test-support`
//! feature, by downstream crates' tests.

use crate::clock::{Clock, FakeClock};
use crate::event::EventDispatcher;
use crate::resource::base::ResourceContext;
use crate::store::{Deleted, FileStore, StoreError, Uploaded};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory file store recording uploads and deletes.
#[derive(Default)]
pub struct TestStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    deletes: Mutex<Vec<String>>,
}

impl TestStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    pub fn deleted_names(&self) -> Vec<String> {
        self.deletes.lock().clone()
    }
}

impl FileStore for TestStore {
    fn upload(&self, name: &str, bytes: &[u8]) -> Result<Uploaded, StoreError> {
        self.files.lock().insert(name.to_string(), bytes.to_vec());
        Ok(Uploaded { filename: name.to_string() })
    }

    fn download(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.files
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { name: name.to_string() })
    }

    fn delete(&self, name: &str) -> Result<Deleted, StoreError> {
        self.deletes.lock().push(name.to_string());
        let message = match self.files.lock().remove(name) {
            Some(_) => "File deleted",
            None => "File not found",
        };
        Ok(Deleted { message: message.to_string() })
    }

    fn file_url(&self, name: &str) -> String {
        format!("http://store.test/file/{name}")
    }
}

/// Everything a resource test needs, pre-wired.
pub struct TestContext {
    pub ctx: ResourceContext,
    pub events: Arc<EventDispatcher>,
    pub clock: FakeClock,
    pub store: Arc<TestStore>,
}

/// Fresh context with a quiet dispatcher, fake clock, and in-memory store.
pub fn context() -> TestContext {
    let events = Arc::new(EventDispatcher::with_debug(false));
    let clock = FakeClock::new();
    let store = TestStore::new();
    let ctx = ResourceContext {
        events: events.clone(),
        clock: Arc::new(clock.clone()) as Arc<dyn Clock>,
        store: store.clone() as Arc<dyn FileStore>,
    };
    TestContext { ctx, events, clock, store }
}
