// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Dataset metadata: table records and the token index over them.

pub mod index;
pub mod tables;

pub use index::MetadataIndex;
pub use tables::{
    parse_scene_id, Annotation, CalibratedSensor, EgoPose, Sample, SampleData, Scene, Sensor,
};
