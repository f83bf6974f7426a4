// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioning, pooling, and sibling reconciliation through the public API.

use parking_lot::Mutex;
use relay_core::test_support::context;
use relay_core::{
    DataToken, Frame, PoolSize, ResourceConfig, ResourceCreator, ResourceData, RESOURCE_UPDATED,
};
use std::sync::Arc;

fn token_log(t: &relay_core::test_support::TestContext) -> Arc<Mutex<Vec<DataToken>>> {
    let tokens = Arc::new(Mutex::new(Vec::new()));
    {
        let tokens = tokens.clone();
        t.events.on(RESOURCE_UPDATED, move |payload| {
            if let Some(token) = payload.token() {
                tokens.lock().push(token.clone());
            }
            Ok(())
        });
    }
    tokens
}

fn frame(seed: u8) -> Frame {
    Frame::gray(4, 4, (0..16).map(|i| i as u8 ^ seed).collect())
}

#[test]
fn version_monotonicity_under_pool_eviction() {
    let t = context();
    let tokens = token_log(&t);
    let creator = ResourceCreator::builtin(t.ctx.clone());

    let image = creator
        .create(
            "image.v1",
            ResourceConfig::new("image", vec!["cam".into()])
                .with_filename("cam_image.jpg")
                .with_pool_size(PoolSize::Bounded(3)),
        )
        .unwrap();

    for seed in 0..6u8 {
        image.lock().set_data(Some(ResourceData::Frame(frame(seed))));
    }

    {
        let image = image.lock();
        let base = image.base();
        assert_eq!(base.pool_len(), 3);
        // Constructor pushed version 1; six frames took it to 7, and the
        // bounded pool retains the newest three.
        assert_eq!(base.pooled_versions(), vec![5, 6, 7]);
    }

    let tokens = tokens.lock();
    assert_eq!(tokens.len(), 7);
    assert!(tokens.windows(2).all(|pair| pair[0].version < pair[1].version));
}

#[test]
fn set_data_null_still_versions_and_notifies() {
    let t = context();
    let tokens = token_log(&t);
    let creator = ResourceCreator::builtin(t.ctx.clone());

    let resource = creator
        .create("number.v1", ResourceConfig::new("n", vec!["a".into()]))
        .unwrap();
    resource.lock().set_data(None);
    resource.lock().set_data(None);

    let resource = resource.lock();
    assert_eq!(resource.version(), 3);
    assert_eq!(resource.base().pool_len(), 3);
    assert_eq!(tokens.lock().len(), 3);
}

#[test]
fn device_collection_reconciles_siblings() {
    let t = context();
    let creator = ResourceCreator::builtin(t.ctx.clone());

    let devices = creator
        .create(
            "vision.input.usb_devices.v1",
            ResourceConfig::new("usb_devices", vec!["cam".into()])
                .with_data(ResourceData::Devices(vec![0, 1, 2]))
                .with_generated_siblings(),
        )
        .unwrap();

    {
        let devices = devices.lock();
        let names: Vec<String> =
            devices.siblings().iter().map(|s| s.lock().name().to_string()).collect();
        assert_eq!(names, vec!["usb_device_0", "usb_device_1", "usb_device_2"]);
    }

    devices.lock().set_data(Some(ResourceData::Devices(vec![0, 1])));
    assert_eq!(devices.lock().siblings().len(), 2);

    devices.lock().set_data(Some(ResourceData::Devices(vec![0, 1, 2, 3])));
    {
        let devices = devices.lock();
        let siblings = devices.siblings();
        assert_eq!(siblings.len(), 4);
        let new = siblings[3].lock();
        assert_eq!(new.name(), "usb_device_3");
        assert_eq!(
            new.base().scopes(),
            ["cam".to_string(), "usb_devices".to_string()]
        );
    }
}

#[test]
fn unique_keys_are_enforced_per_writer() {
    // Sole-writer discipline: two writers publishing the same key is a
    // configuration bug. The instance map accepts the overwrite (last
    // write wins) but the key-to-resource binding is always validated.
    let t = context();
    let creator = ResourceCreator::builtin(t.ctx.clone());
    let manager = relay_core::ResourceInstanceManager::new();

    let first = creator
        .create("string.v1", ResourceConfig::new("x", vec!["a".into()]))
        .unwrap();
    manager.set("a.x", first).unwrap();

    let miskeyed = creator
        .create("string.v1", ResourceConfig::new("y", vec!["a".into()]))
        .unwrap();
    assert!(manager.set("a.x", miskeyed).is_err());
    assert_eq!(manager.keys(), vec!["a.x"]);
}
