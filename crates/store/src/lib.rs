// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! relay-store: file store implementations.
//!
//! The [`relay_core::FileStore`] trait is implemented here for a local
//! directory. The store's URL scheme for downloads is
//! `{store_url}/file/{name}`, the stable form embedded in serialized image
//! records.

mod local;

pub use local::LocalStore;
