// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the Relay control surface and observer stream.
//!
//! The transport is deliberately opaque: any request/response framing that
//! can carry these JSON shapes (HTTP handlers, a websocket, a test harness
//! calling the manager directly) will do.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod descriptor;
mod request;
mod response;
mod stream;

pub use descriptor::NodeDescriptor;
pub use request::Request;
pub use response::{Ack, PipelineStatus, StatusReport};
pub use stream::{image_urls, ImageUrl, StreamMessage};
