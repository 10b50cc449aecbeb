// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Box interpolation over the miniature dataset.

mod common;

use std::f64::consts::FRAC_PI_4;

use glam::{DQuat, DVec3};

use common::{mini_dataset, SCENE_A};
use nuscenes2mcap::annotation::{category_color, marker_array, AnnotationInterpolator};
use nuscenes2mcap::metadata::SampleData;
use nuscenes2mcap::MetadataIndex;

const EPS: f64 = 1e-9;

fn sample_data(meta: &MetadataIndex, token: &str) -> SampleData {
    meta.scene_sample_data(SCENE_A)
        .into_iter()
        .find(|d| d.token == token)
        .unwrap()
}

#[test]
fn test_keyframe_boxes_are_raw_annotations() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    let samples = meta.scene_samples(SCENE_A);
    let annotations = meta.scene_annotations(SCENE_A);
    let interpolator = AnnotationInterpolator::new(&samples, &annotations);

    let boxes = interpolator.boxes_for(&sample_data(&meta, "sd-lidar-2"));
    assert_eq!(boxes.len(), 2);
    let car = boxes.iter().find(|b| b.token == "ann-car-2").unwrap();
    assert!((car.center - DVec3::new(10.0, 0.0, 0.0)).length() < EPS);
    assert!((car.size - DVec3::new(2.0, 4.5, 1.6)).length() < EPS);

    let first = interpolator.boxes_for(&sample_data(&meta, "sd-cam-1"));
    assert_eq!(first.len(), 2);
    assert!(first.iter().any(|b| b.category_name == "human.pedestrian.adult"));
}

#[test]
fn test_sweep_between_keyframes_is_interpolated() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    let samples = meta.scene_samples(SCENE_A);
    let annotations = meta.scene_annotations(SCENE_A);
    let interpolator = AnnotationInterpolator::new(&samples, &annotations);

    // Sweep at 1.25s, halfway between s1 (1.0s) and s2 (1.5s).
    let boxes = interpolator.boxes_for(&sample_data(&meta, "sd-lidar-sweep"));
    assert_eq!(boxes.len(), 2);

    let car = boxes.iter().find(|b| b.token == "ann-car-2").unwrap();
    assert!((car.center - DVec3::new(5.0, 0.0, 0.0)).length() < EPS);
    let expected = DQuat::from_rotation_z(FRAC_PI_4);
    assert!(car.orientation.angle_between(expected) < 1e-6);

    // Not annotated at s1, so it stays where s2 puts it.
    let bike = boxes.iter().find(|b| b.token == "ann-bike-2").unwrap();
    assert!((bike.center - DVec3::new(-3.0, 2.0, 0.0)).length() < EPS);
    assert!(bike.orientation.angle_between(DQuat::IDENTITY) < 1e-6);
}

#[test]
fn test_box_colors_follow_category() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    let samples = meta.scene_samples(SCENE_A);
    let annotations = meta.scene_annotations(SCENE_A);
    let interpolator = AnnotationInterpolator::new(&samples, &annotations);

    let boxes = interpolator.boxes_for(&sample_data(&meta, "sd-radar-2"));
    for bbox in &boxes {
        assert_eq!(bbox.color, category_color(&bbox.category_name));
    }
    assert_ne!(
        category_color("vehicle.car"),
        category_color("human.pedestrian.adult")
    );

    let markers = marker_array(&boxes, 1_500_000);
    assert_eq!(markers.markers.len(), boxes.len());
}

#[test]
fn test_scene_without_annotations_yields_no_boxes() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    let samples = meta.scene_samples("scene-b");
    let annotations = meta.scene_annotations("scene-b");
    let interpolator = AnnotationInterpolator::new(&samples, &annotations);

    let data = meta.scene_sample_data("scene-b");
    assert!(interpolator.boxes_for(&data[0]).is_empty());
}

#[test]
fn test_interpolated_orientation_is_unit_length() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    let samples = meta.scene_samples(SCENE_A);
    let annotations = meta.scene_annotations(SCENE_A);
    let interpolator = AnnotationInterpolator::new(&samples, &annotations);

    for bbox in interpolator.boxes_for(&sample_data(&meta, "sd-lidar-sweep")) {
        assert!((bbox.orientation.length() - 1.0).abs() < 1e-9, "{}", bbox.token);
    }
}

#[test]
fn test_sweep_outside_keyframes_is_clamped() {
    let fixture = mini_dataset();
    let meta = MetadataIndex::load(fixture.meta()).unwrap();
    let samples = meta.scene_samples(SCENE_A);
    let annotations = meta.scene_annotations(SCENE_A);
    let interpolator = AnnotationInterpolator::new(&samples, &annotations);
    let sweep = sample_data(&meta, "sd-lidar-sweep");

    let car = |timestamp: u64| {
        let data = SampleData {
            timestamp,
            ..sweep.clone()
        };
        interpolator
            .boxes_for(&data)
            .into_iter()
            .find(|b| b.token == "ann-car-2")
            .unwrap()
    };

    // Before s1: held at the previous keyframe pose.
    let early = car(500_000);
    assert!(early.center.length() < EPS);
    assert!(early.orientation.angle_between(DQuat::IDENTITY) < 1e-6);

    // After s2: held at the current keyframe pose.
    let late = car(1_900_000);
    assert!((late.center - DVec3::new(10.0, 0.0, 0.0)).length() < EPS);
    assert!(late.orientation.angle_between(DQuat::from_rotation_z(2.0 * FRAC_PI_4)) < 1e-6);
}
