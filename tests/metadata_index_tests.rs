// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Metadata index tests against the miniature dataset.

mod common;

use std::fs;

use serde_json::json;

use common::{mini_dataset, SCENE_A, SCENE_B};
use nuscenes2mcap::{ConvertError, MetadataIndex};

#[test]
fn test_load_scenes_in_file_order() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();

    assert_eq!(meta.scene_count(), 2);
    assert_eq!(meta.scenes_all(), vec![SCENE_A.to_string(), SCENE_B.to_string()]);

    let scene = meta.scene_info(SCENE_A).unwrap();
    assert_eq!(scene.scene_id, 1);
    assert_eq!(scene.name, "scene-0001");
    assert_eq!(scene.sample_count, 2);
    assert!(meta.scene_info("unknown").is_none());
}

#[test]
fn test_resolve_scene_selectors() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();

    assert_eq!(meta.resolve_scene(SCENE_B).as_deref(), Some(SCENE_B));
    assert_eq!(meta.resolve_scene("scene-0002").as_deref(), Some(SCENE_B));
    assert_eq!(meta.resolve_scene("1").as_deref(), Some(SCENE_A));
    assert_eq!(meta.resolve_scene("7"), None);
    assert_eq!(meta.resolve_scene("scene-9999"), None);
}

#[test]
fn test_scene_views() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();

    let samples = meta.scene_samples(SCENE_A);
    assert_eq!(samples.len(), 2);
    assert_eq!(samples["s2"].prev, "s1");

    let data = meta.scene_sample_data(SCENE_A);
    assert_eq!(data.len(), 7);
    assert!(data.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    let sweep = data.iter().find(|d| d.token == "sd-lidar-sweep").unwrap();
    assert!(!sweep.is_key_frame);
    assert_eq!(sweep.sample_token, "s2");

    let poses = meta.ego_poses(SCENE_A);
    assert_eq!(poses.len(), 7);
    assert!(poses.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    assert_eq!(meta.scene_sample_data(SCENE_B).len(), 1);
    assert!(meta.scene_sample_data("unknown").is_empty());
}

#[test]
fn test_calibrated_sensors_ordered_by_channel() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();

    let channels: Vec<String> = meta
        .scene_calibrated_sensors(SCENE_A)
        .into_iter()
        .map(|(_, sensor)| sensor.channel)
        .collect();
    assert_eq!(channels, ["CAM_FRONT", "LIDAR_TOP", "RADAR_FRONT"]);

    assert_eq!(meta.sensor_name("cs-lidar").as_deref(), Some("lidar_top"));
    assert!(meta.calibrated_sensor("cs-cam").unwrap().intrinsic().is_some());
    assert!(meta.calibrated_sensor("cs-radar").unwrap().intrinsic().is_none());

    let only_camera = meta.scene_calibrated_sensors(SCENE_B);
    assert_eq!(only_camera.len(), 1);
    assert_eq!(only_camera[0].1.frame_name(), "cam_front");
}

#[test]
fn test_annotations_carry_category_names() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();

    let annotations = meta.scene_annotations(SCENE_A);
    assert_eq!(annotations.len(), 2);
    let mut names: Vec<&str> = annotations["s1"]
        .iter()
        .map(|a| a.category_name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["human.pedestrian.adult", "vehicle.car"]);

    assert!(meta.scene_annotations(SCENE_B).is_empty());
}

#[test]
fn test_annotation_tables_are_optional() {
    let fixture = mini_dataset();
    for table in ["sample_annotation", "instance", "category"] {
        fs::remove_file(fixture.meta().join(format!("{table}.json"))).unwrap();
    }

    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    assert_eq!(meta.scene_count(), 2);
    assert!(meta.scene_annotations(SCENE_A).is_empty());
}

#[test]
fn test_required_table_missing() {
    let fixture = mini_dataset();
    fs::remove_file(fixture.meta().join("ego_pose.json")).unwrap();
    assert!(MetadataIndex::load(fixture.meta()).is_err());
}

#[test]
fn test_missing_directory() {
    let fixture = mini_dataset();
    let err = MetadataIndex::load(fixture.root().join("v1.0-nope")).unwrap_err();
    assert!(matches!(err, ConvertError::Io { .. }));
}

#[test]
fn test_malformed_table() {
    let fixture = mini_dataset();
    fs::write(fixture.meta().join("sample.json"), b"[{\"token\": ").unwrap();
    assert!(MetadataIndex::load(fixture.meta()).is_err());
}

#[test]
fn test_sample_chain_cycle_rejected() {
    let fixture = mini_dataset();
    fixture.write_table(
        "sample",
        json!([
            {"token": "s1", "timestamp": 1_000_000, "prev": "s2", "next": "s2", "scene_token": SCENE_A},
            {"token": "s2", "timestamp": 1_500_000, "prev": "s1", "next": "s1", "scene_token": SCENE_A},
            {"token": "s3", "timestamp": 2_000_000, "prev": "", "next": "", "scene_token": SCENE_B},
        ]),
    );
    let err = MetadataIndex::load(fixture.meta()).unwrap_err();
    assert!(err.to_string().contains("revisits"));
}
