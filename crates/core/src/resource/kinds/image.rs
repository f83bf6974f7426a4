// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `image.v1` — raw frame resource backed by the file store.
//!
//! Frames are kept in the pool as raw matrices. Serialization encodes the
//! latest frame as JPEG, overwrites a stable filename in the store (video-
//! like updates), and emits a `?v={version}` cache-busting URL so caching
//! consumers re-fetch on every version.

use crate::error::ResourceError;
use crate::resource::base::{ResourceBase, ResourceConfig, ResourceContext};
use crate::resource::data::{Frame, ResourceData};
use crate::resource::record::ResourceRecord;
use crate::resource::{Resource, SharedResource};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const SCHEMA: &str = "image.v1";

/// JPEG quality used for every stored frame.
const JPEG_QUALITY: u8 = 80;

pub struct ImageResource {
    base: ResourceBase,
    filename: String,
}

impl ImageResource {
    pub fn new(ctx: ResourceContext, config: ResourceConfig) -> Result<Self, ResourceError> {
        let filename = config.filename.clone().unwrap_or_else(|| "image.jpg".to_string());
        Ok(Self { base: ResourceBase::new(ctx, &config)?, filename })
    }

    pub fn shared(
        ctx: ResourceContext,
        config: ResourceConfig,
    ) -> Result<SharedResource, ResourceError> {
        Ok(Arc::new(Mutex::new(Self::new(ctx, config)?)))
    }

    /// Rehydrate from a serialized record whose `data` is a store URL:
    /// download the named file and decode the JPEG bytes back into a frame.
    pub fn revive(
        ctx: ResourceContext,
        record: &ResourceRecord,
    ) -> Result<SharedResource, ResourceError> {
        let mut config = ResourceConfig::new(&record.name, record.scopes.clone());
        if let Some(url) = record.data.as_str() {
            let filename = filename_from_url(url).ok_or_else(|| ResourceError::Revive {
                schema: SCHEMA.to_string(),
                reason: format!("not a store URL: {url}"),
            })?;
            let bytes = ctx.store.download(filename)?;
            config.data = Some(ResourceData::Frame(decode_jpeg(&bytes)?));
            config.filename = Some(filename.to_string());
        }
        Self::shared(ctx, config)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl Resource for ImageResource {
    fn schema(&self) -> &'static str {
        SCHEMA
    }

    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }

    fn serialize(&self) -> Result<Vec<ResourceRecord>, ResourceError> {
        let Some(item) = self.base.latest() else {
            return Ok(Vec::new());
        };

        let data = match item.data.as_ref().and_then(ResourceData::as_frame) {
            Some(frame) => {
                let bytes = encode_jpeg(frame).map_err(|reason| ResourceError::Serialize {
                    key: self.base.key().to_string(),
                    reason,
                })?;
                let store = &self.base.context().store;
                store.upload(&self.filename, &bytes)?;
                Value::String(format!(
                    "{}?v={}",
                    store.file_url(&self.filename),
                    item.version
                ))
            }
            None => Value::Null,
        };

        Ok(self.base.record_with(SCHEMA, data).into_iter().collect())
    }

    fn dispose(&mut self) {
        if let Err(err) = self.base.context().store.delete(&self.filename) {
            warn!(filename = %self.filename, error = %err, "image file delete failed");
        }
        self.base.dispose_siblings();
    }
}

fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>, String> {
    let color = match frame.channels {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        other => return Err(format!("unsupported channel count {other}")),
    };
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode(&frame.pixels, frame.width, frame.height, color)
        .map_err(|err| format!("JPEG encode failed: {err}"))?;
    Ok(bytes)
}

fn decode_jpeg(bytes: &[u8]) -> Result<Frame, ResourceError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| ResourceError::Revive {
            schema: SCHEMA.to_string(),
            reason: format!("JPEG decode failed: {err}"),
        })?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    Ok(Frame::rgb(width, height, decoded.into_raw()))
}

/// `{store_url}/file/{name}?v={version}` → `{name}`.
fn filename_from_url(url: &str) -> Option<&str> {
    let (_, tail) = url.split_once("/file/")?;
    Some(tail.split('?').next().unwrap_or(tail))
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
