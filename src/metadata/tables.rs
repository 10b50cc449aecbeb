// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Records of the dataset's JSON metadata tables.
//!
//! Field names follow the table columns. Columns the converter never reads
//! are left out; serde ignores them.

use serde::Deserialize;

use crate::core::{ConvertError, Result, Token};

/// Row of `scene.json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SceneRecord {
    pub token: Token,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub first_sample_token: Token,
    pub last_sample_token: Token,
    #[serde(default)]
    pub nbr_samples: u32,
}

/// A recorded drive segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Number parsed from the scene name, used to name the output log
    pub scene_id: u32,
    pub token: Token,
    pub name: String,
    pub description: String,
    pub first_sample_token: Token,
    pub last_sample_token: Token,
    pub sample_count: u32,
}

impl Scene {
    pub(crate) fn from_record(record: SceneRecord) -> Result<Self> {
        let scene_id = parse_scene_id(&record.name).ok_or_else(|| {
            ConvertError::parse(
                "scene.json",
                format!("scene name '{}' carries no numeric id", record.name),
            )
        })?;
        Ok(Self {
            scene_id,
            token: record.token,
            name: record.name,
            description: record.description,
            first_sample_token: record.first_sample_token,
            last_sample_token: record.last_sample_token,
            sample_count: record.nbr_samples,
        })
    }
}

/// Parse the numeric id out of a name like `scene-0061`.
pub fn parse_scene_id(name: &str) -> Option<u32> {
    name.rsplit(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())?
        .parse()
        .ok()
}

/// An annotated keyframe. `prev`/`next` are empty at the ends of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sample {
    pub token: Token,
    pub timestamp: u64,
    #[serde(default)]
    pub prev: Token,
    #[serde(default)]
    pub next: Token,
    pub scene_token: Token,
}

/// One sensor file, either a keyframe or an intermediate sweep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SampleData {
    pub token: Token,
    pub sample_token: Token,
    pub ego_pose_token: Token,
    pub calibrated_sensor_token: Token,
    pub timestamp: u64,
    #[serde(default)]
    pub fileformat: String,
    pub is_key_frame: bool,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub width: u32,
    /// Path relative to the dataset root
    pub filename: String,
    #[serde(default)]
    pub prev: Token,
    #[serde(default)]
    pub next: Token,
}

/// Vehicle pose in the global frame. Rotation is `[w, x, y, z]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EgoPose {
    pub token: Token,
    pub timestamp: u64,
    pub rotation: [f64; 4],
    pub translation: [f64; 3],
}

/// Mounting of a sensor on the vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalibratedSensor {
    pub token: Token,
    pub sensor_token: Token,
    pub translation: [f64; 3],
    pub rotation: [f64; 4],
    /// 3x3 row-major intrinsic matrix; empty for non-camera sensors
    #[serde(default)]
    pub camera_intrinsic: Vec<Vec<f64>>,
}

impl CalibratedSensor {
    /// Intrinsic matrix, if the sensor is a calibrated camera.
    pub fn intrinsic(&self) -> Option<[[f64; 3]; 3]> {
        if self.camera_intrinsic.len() != 3 {
            return None;
        }
        let mut k = [[0.0; 3]; 3];
        for (row, values) in k.iter_mut().zip(&self.camera_intrinsic) {
            if values.len() != 3 {
                return None;
            }
            row.copy_from_slice(values);
        }
        Some(k)
    }
}

/// A physical sensor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sensor {
    pub token: Token,
    /// Channel name such as `CAM_FRONT`
    pub channel: String,
    pub modality: String,
}

impl Sensor {
    /// Lower-cased channel, used for topic names and frame ids.
    pub fn frame_name(&self) -> String {
        self.channel.to_lowercase()
    }
}

/// Row of `sample_annotation.json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AnnotationRecord {
    pub token: Token,
    pub sample_token: Token,
    pub instance_token: Token,
    pub translation: [f64; 3],
    pub size: [f64; 3],
    pub rotation: [f64; 4],
}

/// A labeled object on a keyframe, with its category resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub token: Token,
    pub sample_token: Token,
    pub instance_token: Token,
    pub translation: [f64; 3],
    /// Width, length, height
    pub size: [f64; 3],
    /// `[w, x, y, z]`
    pub rotation: [f64; 4],
    /// Empty when the instance or category cannot be resolved
    pub category_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InstanceRecord {
    pub token: Token,
    pub category_token: Token,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryRecord {
    pub token: Token,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene_id() {
        assert_eq!(parse_scene_id("scene-0061"), Some(61));
        assert_eq!(parse_scene_id("scene-1100"), Some(1100));
        assert_eq!(parse_scene_id("night"), None);
    }

    #[test]
    fn test_intrinsic_requires_3x3() {
        let mut calib = CalibratedSensor {
            token: "c".into(),
            sensor_token: "s".into(),
            translation: [0.0; 3],
            rotation: [1.0, 0.0, 0.0, 0.0],
            camera_intrinsic: vec![],
        };
        assert!(calib.intrinsic().is_none());
        calib.camera_intrinsic = vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 3.0], vec![0.0, 0.0, 1.0]];
        assert_eq!(calib.intrinsic().unwrap()[1][2], 3.0);
        calib.camera_intrinsic[2].pop();
        assert!(calib.intrinsic().is_none());
    }

    #[test]
    fn test_sample_missing_links_default_empty() {
        let sample: Sample =
            serde_json::from_str(r#"{"token":"a","timestamp":5,"scene_token":"s"}"#).unwrap();
        assert!(sample.prev.is_empty());
        assert!(sample.next.is_empty());
    }
}
