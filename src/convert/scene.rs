// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Conversion of one scene into one log.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::ThreadPool;
use tracing::{debug, info, warn};

use super::FileProgress;
use crate::annotation::{boxes_message, marker_array, AnnotationInterpolator};
use crate::config::{BoxSource, ConvertConfig};
use crate::core::{ConvertError, Result, Token};
use crate::dataset::{classify_file, extract_file_info, SensorCategory};
use crate::decode::DecoderRegistry;
use crate::io::{SceneLog, WriterOptions};
use crate::messages::{
    CameraInfo, Header, Odometry, Point, Pose, Quaternion, TFMessage, TransformStamped,
};
use crate::metadata::{
    Annotation, CalibratedSensor, EgoPose, MetadataIndex, Sample, SampleData, Scene, Sensor,
};
use crate::pipeline::{run_decode_pipeline, DecodeItem, DecodeTask};

pub const TOPIC_ODOM: &str = "/odom";
pub const TOPIC_TF: &str = "/tf";
pub const TOPIC_BOXES: &str = "boxes";
pub const TOPIC_BOXES_VIZ: &str = "boxes_viz";

pub const MAP_FRAME: &str = "map";
pub const ODOM_FRAME: &str = "odom";
pub const BASE_FRAME: &str = "base_link";

/// Topic of a sensor's decoded payload: `<sensor>/raw` for cameras, `<sensor>` otherwise.
pub fn sensor_topic(category: SensorCategory, sensor: &str) -> String {
    match category {
        SensorCategory::Camera => format!("{sensor}/raw"),
        SensorCategory::Lidar | SensorCategory::Radar => sensor.to_string(),
    }
}

/// Topic of a camera's calibration.
pub fn camera_info_topic(sensor: &str) -> String {
    format!("{sensor}/camera_info")
}

/// Lifecycle of a [`SceneConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Scene data resolved, nothing written yet.
    Submitted,
    Converting,
    Complete,
}

/// Outcome of one converted scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneReport {
    pub scene_id: u32,
    pub scene_name: String,
    pub path: PathBuf,
    pub messages: u64,
    /// Raw files decoded and written.
    pub files_written: u64,
    /// Raw files skipped: unclassifiable, unknown sensor or failed decode.
    pub files_skipped: u64,
    pub topics: BTreeMap<String, u64>,
    pub elapsed_secs: f64,
}

/// Converts one scene. Owns every scene-local map for the duration of the run.
#[derive(Debug)]
pub struct SceneConverter<'a> {
    meta: &'a MetadataIndex,
    config: &'a ConvertConfig,
    state: SceneState,
    scene: Scene,
    samples: HashMap<Token, Sample>,
    annotations: HashMap<Token, Vec<Annotation>>,
    sample_data: Vec<SampleData>,
    ego_poses: Vec<EgoPose>,
    calibrations: Vec<(CalibratedSensor, Sensor)>,
}

impl<'a> SceneConverter<'a> {
    /// Resolve everything the scene needs. An unknown token fails with
    /// [`ConvertError::MissingScene`].
    pub fn submit(
        meta: &'a MetadataIndex,
        config: &'a ConvertConfig,
        scene_token: &str,
    ) -> Result<Self> {
        let scene = meta
            .scene_info(scene_token)
            .ok_or_else(|| ConvertError::missing_scene(scene_token))?;
        let converter = Self {
            meta,
            config,
            state: SceneState::Submitted,
            samples: meta.scene_samples(scene_token),
            annotations: meta.scene_annotations(scene_token),
            sample_data: meta.scene_sample_data(scene_token),
            ego_poses: meta.ego_poses(scene_token),
            calibrations: meta.scene_calibrated_sensors(scene_token),
            scene,
        };
        debug!(
            scene = %converter.scene.name,
            samples = converter.samples.len(),
            sample_data = converter.sample_data.len(),
            ego_poses = converter.ego_poses.len(),
            "Scene submitted"
        );
        Ok(converter)
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of raw files referenced by the scene.
    pub fn file_count(&self) -> usize {
        self.sample_data.len()
    }

    /// `<output_dir>/<scene_id>.mcap`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.mcap", self.scene.scene_id))
    }

    /// Write the scene's log. The log is finalized on every exit path.
    pub fn run(
        &mut self,
        dataset_root: &Path,
        output_dir: &Path,
        pool: &ThreadPool,
        registry: &DecoderRegistry,
        progress: &FileProgress,
    ) -> Result<SceneReport> {
        if self.state != SceneState::Submitted {
            return Err(ConvertError::Other(format!(
                "scene {} was already converted",
                self.scene.name
            )));
        }
        self.state = SceneState::Converting;
        let start = Instant::now();
        progress.add_files(self.file_count() as u64);
        progress.set_message(self.scene.name.clone());

        let path = self.output_path(output_dir);
        info!(scene = %self.scene.name, path = %path.display(), "Converting scene");
        let mut log = SceneLog::create(
            &path,
            WriterOptions {
                compression_level: self.config.compression_level,
                chunk_size: self.config.chunk_size,
            },
        )?;

        self.write_poses(&mut log)?;
        let (tasks, unresolved) = self.write_annotations(&mut log, dataset_root)?;
        progress.inc(unresolved);

        let stats = run_decode_pipeline(
            pool,
            registry,
            tasks,
            self.config.queue_capacity,
            &mut log,
            progress,
        )?;

        let summary = log.close()?;
        self.state = SceneState::Complete;

        let report = SceneReport {
            scene_id: self.scene.scene_id,
            scene_name: self.scene.name.clone(),
            path: summary.path,
            messages: summary.messages,
            files_written: stats.written,
            files_skipped: stats.skipped + unresolved,
            topics: summary.topics,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            scene = %report.scene_name,
            messages = report.messages,
            files_written = report.files_written,
            files_skipped = report.files_skipped,
            elapsed_secs = report.elapsed_secs,
            "Scene converted"
        );
        Ok(report)
    }

    /// `/odom` and `/tf` for every ego pose.
    fn write_poses(&self, log: &mut SceneLog) -> Result<()> {
        let sensor_transforms: Vec<TransformStamped> = self
            .calibrations
            .iter()
            .map(|(calib, sensor)| {
                TransformStamped::new(
                    BASE_FRAME,
                    &sensor.frame_name(),
                    calib.translation,
                    calib.rotation,
                    0,
                )
            })
            .collect();

        for pose in &self.ego_poses {
            let stamp = pose.timestamp;
            let odom = Odometry::new(
                Header::new(ODOM_FRAME, stamp),
                BASE_FRAME,
                Pose {
                    position: Point {
                        x: pose.translation[0],
                        y: pose.translation[1],
                        z: pose.translation[2],
                    },
                    orientation: Quaternion::from_wxyz(pose.rotation),
                },
            );
            log.write(TOPIC_ODOM, stamp, &odom)?;

            let mut transforms = Vec::with_capacity(sensor_transforms.len() + 2);
            transforms.push(TransformStamped::new(
                ODOM_FRAME,
                BASE_FRAME,
                pose.translation,
                pose.rotation,
                stamp,
            ));
            transforms.extend(sensor_transforms.iter().map(|tf| tf.restamped(stamp)));
            transforms.push(TransformStamped::identity(MAP_FRAME, ODOM_FRAME, stamp));
            log.write(TOPIC_TF, stamp, &TFMessage { transforms })?;
        }
        Ok(())
    }

    /// Boxes, markers and camera info per sample data; returns the decode
    /// tasks grouped by sensor and the number of files that could not be
    /// attributed to a sensor.
    fn write_annotations(
        &self,
        log: &mut SceneLog,
        dataset_root: &Path,
    ) -> Result<(Vec<DecodeTask>, u64)> {
        let interpolator = AnnotationInterpolator::new(&self.samples, &self.annotations);
        let intrinsics: HashMap<&str, [[f64; 3]; 3]> = self
            .calibrations
            .iter()
            .filter_map(|(calib, _)| calib.intrinsic().map(|k| (calib.token.as_str(), k)))
            .collect();

        let mut tasks: BTreeMap<String, DecodeTask> = BTreeMap::new();
        let mut unresolved = 0u64;

        for data in &self.sample_data {
            let Some(category) = classify_file(&data.filename) else {
                unresolved += 1;
                continue;
            };
            let Some(sensor) = self.sensor_name(data) else {
                warn!(
                    sample_data = %data.token,
                    file = %data.filename,
                    "Cannot resolve sensor of sample data, skipping"
                );
                unresolved += 1;
                continue;
            };
            let stamp = data.timestamp;

            let wants_boxes = match self.config.box_source {
                BoxSource::All => true,
                BoxSource::Lidar => category == SensorCategory::Lidar,
            };
            if wants_boxes {
                let boxes = interpolator.boxes_for(data);
                log.write(TOPIC_BOXES, stamp, &boxes_message(&boxes, stamp))?;
                log.write(TOPIC_BOXES_VIZ, stamp, &marker_array(&boxes, stamp))?;
            }

            if category == SensorCategory::Camera && self.config.camera_info {
                if let Some(k) = intrinsics.get(data.calibrated_sensor_token.as_str()) {
                    let info = CameraInfo::from_intrinsic(
                        Header::new(sensor.as_str(), stamp),
                        data.width,
                        data.height,
                        k,
                    );
                    log.write(&camera_info_topic(&sensor), stamp, &info)?;
                }
            }

            let topic = sensor_topic(category, &sensor);
            tasks
                .entry(topic.clone())
                .or_insert_with(|| DecodeTask {
                    topic,
                    frame_id: sensor.clone(),
                    category,
                    items: Vec::new(),
                })
                .items
                .push(DecodeItem {
                    path: dataset_root.join(&data.filename),
                    info: data.clone(),
                });
        }

        Ok((tasks.into_values().collect(), unresolved))
    }

    /// Lower-cased sensor channel of a sample data record, falling back to
    /// the channel encoded in its file name.
    fn sensor_name(&self, data: &SampleData) -> Option<String> {
        self.meta
            .sensor_name(&data.calibrated_sensor_token)
            .or_else(|| extract_file_info(&data.filename).map(|info| info.channel.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_topics() {
        assert_eq!(sensor_topic(SensorCategory::Camera, "cam_front"), "cam_front/raw");
        assert_eq!(sensor_topic(SensorCategory::Lidar, "lidar_top"), "lidar_top");
        assert_eq!(sensor_topic(SensorCategory::Radar, "radar_front"), "radar_front");
        assert_eq!(camera_info_topic("cam_back"), "cam_back/camera_info");
    }

    #[test]
    fn test_unknown_scene_is_missing() {
        let meta = MetadataIndex::default();
        let config = ConvertConfig::default();
        let err = SceneConverter::submit(&meta, &config, "nope").unwrap_err();
        assert!(matches!(err, ConvertError::MissingScene { .. }));
    }
}
