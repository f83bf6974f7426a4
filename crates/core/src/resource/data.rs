// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed resource payloads.

use serde_json::Value;

/// A raw image frame: kind-opaque byte matrix, row-major.
///
/// `channels` is 1 (grayscale) or 3 (RGB); `pixels.len()` equals
/// `width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn gray(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, channels: 1, pixels }
    }

    pub fn rgb(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, channels: 3, pixels }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty() || self.width == 0 || self.height == 0
    }
}

/// Payload of one resource version.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceData {
    Text(String),
    Number(f64),
    Numbers(Vec<f64>),
    /// A device id, e.g. a USB camera index.
    Device(u32),
    Devices(Vec<u32>),
    Frame(Frame),
    /// Escape hatch for kinds the engine does not interpret.
    Json(Value),
}

impl ResourceData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResourceData::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResourceData::Number(n) => Some(*n),
            ResourceData::Device(id) => Some(f64::from(*id)),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            ResourceData::Numbers(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_devices(&self) -> Option<&[u32]> {
        match self {
            ResourceData::Devices(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            ResourceData::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    /// JSON rendering for serialized records. Frames have no direct JSON
    /// form; the image kind replaces them with a store URL.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ResourceData::Text(s) => Some(Value::String(s.clone())),
            ResourceData::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            ResourceData::Numbers(ns) => Some(Value::Array(
                ns.iter()
                    .filter_map(|n| serde_json::Number::from_f64(*n).map(Value::Number))
                    .collect(),
            )),
            ResourceData::Device(id) => Some(Value::from(*id)),
            ResourceData::Devices(ids) => {
                Some(Value::Array(ids.iter().map(|id| Value::from(*id)).collect()))
            }
            ResourceData::Frame(_) => None,
            ResourceData::Json(value) => Some(value.clone()),
        }
    }

    /// Best-effort inverse of [`to_json`](Self::to_json) for reviving
    /// primitive records. `Null` maps to `None`.
    pub fn from_json(value: &Value) -> Option<ResourceData> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(ResourceData::Text(s.clone())),
            Value::Number(n) => n.as_f64().map(ResourceData::Number),
            Value::Array(items) => {
                let numbers: Option<Vec<f64>> =
                    items.iter().map(serde_json::Value::as_f64).collect();
                match numbers {
                    Some(ns) => Some(ResourceData::Numbers(ns)),
                    None => Some(ResourceData::Json(value.clone())),
                }
            }
            other => Some(ResourceData::Json(other.clone())),
        }
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
