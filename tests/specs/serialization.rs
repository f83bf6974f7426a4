// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialization round trips, including image rehydration through a real
//! on-disk store.

use relay_core::{
    Clock, EventDispatcher, Frame, ResourceConfig, ResourceContext, ResourceCreator, ResourceData,
    SystemClock,
};
use relay_store::LocalStore;
use std::sync::Arc;

fn disk_creator(dir: &std::path::Path) -> ResourceCreator {
    let ctx = ResourceContext {
        events: Arc::new(EventDispatcher::with_debug(false)),
        clock: Arc::new(SystemClock) as Arc<dyn Clock>,
        store: Arc::new(LocalStore::new(dir.join("files"), "http://localhost:8000")),
    };
    ResourceCreator::builtin(ctx)
}

#[test]
fn string_resource_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let creator = disk_creator(dir.path());

    let resource = creator
        .create(
            "string.v1",
            ResourceConfig::new("greeting", vec!["node_a".into()])
                .with_data(ResourceData::Text("hello".into())),
        )
        .unwrap();
    let record = resource.lock().serialize().unwrap().remove(0);

    let revived = creator.revive(&record).unwrap();
    let again = revived.lock().serialize().unwrap().remove(0);

    assert_eq!(again.data, record.data);
    assert_eq!(again.name, record.name);
    assert_eq!(again.scopes, record.scopes);
    assert_eq!(again.schema, record.schema);
}

#[test]
fn image_record_url_dereferences_to_the_encoded_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let creator = disk_creator(dir.path());

    let image = creator
        .create(
            "image.v1",
            ResourceConfig::new("image", vec!["cam".into()]).with_filename("cam_image.jpg"),
        )
        .unwrap();
    let frame = Frame::gray(16, 8, (0..128).map(|i| (i * 2) as u8).collect());
    image.lock().set_data(Some(ResourceData::Frame(frame)));

    let record = image.lock().serialize().unwrap().remove(0);
    let url = record.data.as_str().unwrap();
    assert_eq!(url, "http://localhost:8000/file/cam_image.jpg?v=2");

    // The URL's file exists in the store and holds a decodable JPEG of
    // the frame just set.
    let bytes = std::fs::read(dir.path().join("files").join("cam_image.jpg")).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (16, 8));
}

#[test]
fn image_resource_round_trips_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let creator = disk_creator(dir.path());

    let image = creator
        .create(
            "image.v1",
            ResourceConfig::new("image", vec!["cam".into()]).with_filename("cam_image.jpg"),
        )
        .unwrap();
    image
        .lock()
        .set_data(Some(ResourceData::Frame(Frame::gray(8, 8, vec![128; 64]))));
    let record = image.lock().serialize().unwrap().remove(0);

    let revived = creator.revive(&record).unwrap();
    let frame = revived.lock().get_data(None).unwrap();
    let frame = frame.as_frame().unwrap().clone();
    assert_eq!((frame.width, frame.height), (8, 8));

    let again = revived.lock().serialize().unwrap().remove(0);
    assert_eq!(again.name, record.name);
    assert_eq!(again.scopes, record.scopes);
    assert_eq!(again.schema, record.schema);
    assert!(again.data.as_str().unwrap().contains("cam_image.jpg?v="));
}

#[test]
fn collection_round_trip_recreates_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let creator = disk_creator(dir.path());

    let numbers = creator
        .create(
            "numbers.v1",
            ResourceConfig::new("values", vec!["node_a".into()])
                .with_data(ResourceData::Numbers(vec![1.5, 2.5]))
                .with_generated_siblings(),
        )
        .unwrap();
    let records = numbers.lock().serialize().unwrap();
    assert_eq!(records.len(), 3);

    let revived = creator.revive(&records[0]).unwrap();
    let revived_records = revived.lock().serialize().unwrap();
    assert_eq!(revived_records.len(), 3);
    assert_eq!(revived_records[0].data, records[0].data);
    assert_eq!(revived_records[1].data, records[1].data);
}
