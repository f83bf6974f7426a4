// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in node kinds: a camera source, a binarization transform, a
//! declarative cast, and a conditional router.

pub mod branch;
pub mod capture;
pub mod cast;
pub mod threshold;

pub use branch::BranchNode;
pub use capture::{CameraBackend, CaptureNode, FrameSource, TestPatternCamera};
pub use cast::CastNode;
pub use threshold::ThresholdNode;
