// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory index over the metadata tables.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::tables::{
    Annotation, AnnotationRecord, CalibratedSensor, CategoryRecord, EgoPose, InstanceRecord,
    Sample, SampleData, Scene, SceneRecord, Sensor,
};
use crate::core::{ConvertError, Result, Token};

/// Token-keyed view of a dataset's metadata.
///
/// Built once by [`MetadataIndex::load`] and read-only afterwards, so one
/// instance can be shared by every scene worker behind an `Arc`.
#[derive(Debug, Default)]
pub struct MetadataIndex {
    scene_order: Vec<Token>,
    scenes: HashMap<Token, Scene>,
    samples: HashMap<Token, Sample>,
    scene_to_samples: HashMap<Token, Vec<Token>>,
    sample_to_data: HashMap<Token, Vec<SampleData>>,
    ego_poses: HashMap<Token, EgoPose>,
    calibrated_sensors: HashMap<Token, CalibratedSensor>,
    sensors: HashMap<Token, Sensor>,
    sample_to_annotations: HashMap<Token, Vec<AnnotationRecord>>,
    instance_categories: HashMap<Token, Token>,
    category_names: HashMap<Token, String>,
}

impl MetadataIndex {
    /// Load every table from a metadata directory (e.g. `v1.0-mini/`).
    ///
    /// `scene`, `sample`, `sample_data`, `ego_pose`, `calibrated_sensor` and
    /// `sensor` are required. `sample_annotation`, `instance` and `category`
    /// may be absent, in which case scenes have no annotations.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ConvertError::io(dir, "metadata directory not found"));
        }

        let mut index = MetadataIndex::default();

        for record in read_table::<SceneRecord>(dir, "scene")? {
            let scene = Scene::from_record(record)?;
            index.scene_order.push(scene.token.clone());
            index.scenes.insert(scene.token.clone(), scene);
        }

        for sample in read_table::<Sample>(dir, "sample")? {
            index
                .scene_to_samples
                .entry(sample.scene_token.clone())
                .or_default()
                .push(sample.token.clone());
            index.samples.insert(sample.token.clone(), sample);
        }

        for data in read_table::<SampleData>(dir, "sample_data")? {
            index
                .sample_to_data
                .entry(data.sample_token.clone())
                .or_default()
                .push(data);
        }

        index.ego_poses = read_table::<EgoPose>(dir, "ego_pose")?
            .into_iter()
            .map(|pose| (pose.token.clone(), pose))
            .collect();
        index.calibrated_sensors = read_table::<CalibratedSensor>(dir, "calibrated_sensor")?
            .into_iter()
            .map(|calib| (calib.token.clone(), calib))
            .collect();
        index.sensors = read_table::<Sensor>(dir, "sensor")?
            .into_iter()
            .map(|sensor| (sensor.token.clone(), sensor))
            .collect();

        for annotation in read_optional_table::<AnnotationRecord>(dir, "sample_annotation")? {
            index
                .sample_to_annotations
                .entry(annotation.sample_token.clone())
                .or_default()
                .push(annotation);
        }
        index.instance_categories = read_optional_table::<InstanceRecord>(dir, "instance")?
            .into_iter()
            .map(|instance| (instance.token, instance.category_token))
            .collect();
        index.category_names = read_optional_table::<CategoryRecord>(dir, "category")?
            .into_iter()
            .map(|category| (category.token, category.name))
            .collect();

        index.check_sample_chains()?;

        debug!(
            scenes = index.scenes.len(),
            samples = index.samples.len(),
            ego_poses = index.ego_poses.len(),
            sensors = index.sensors.len(),
            "Loaded metadata index"
        );
        Ok(index)
    }

    /// Reject scenes whose sample chain loops back on itself, in either direction.
    fn check_sample_chains(&self) -> Result<()> {
        for token in &self.scene_order {
            let scene = &self.scenes[token];
            self.walk_chain(scene, &scene.first_sample_token, |s| &s.next)?;
            self.walk_chain(scene, &scene.last_sample_token, |s| &s.prev)?;
        }
        Ok(())
    }

    fn walk_chain(
        &self,
        scene: &Scene,
        start: &str,
        link: impl Fn(&Sample) -> &Token,
    ) -> Result<()> {
        let mut visited = HashSet::new();
        let mut current = start;
        while !current.is_empty() {
            if !visited.insert(current) {
                return Err(ConvertError::parse(
                    "sample.json",
                    format!(
                        "sample chain of scene '{}' revisits sample '{current}'",
                        scene.name
                    ),
                ));
            }
            match self.samples.get(current) {
                Some(sample) => current = link(sample).as_str(),
                None => break,
            }
        }
        Ok(())
    }

    /// All scene tokens, in file order.
    pub fn scenes_all(&self) -> Vec<Token> {
        self.scene_order.clone()
    }

    /// Number of scenes in the index.
    pub fn scene_count(&self) -> usize {
        self.scene_order.len()
    }

    /// Look up a scene by token.
    pub fn scene_info(&self, scene_token: &str) -> Option<Scene> {
        self.scenes.get(scene_token).cloned()
    }

    /// Resolve a user-supplied scene selector: a numeric id, a scene name or a token.
    pub fn resolve_scene(&self, selector: &str) -> Option<Token> {
        if self.scenes.contains_key(selector) {
            return Some(selector.to_string());
        }
        let numeric = selector.parse::<u32>().ok();
        self.scene_order
            .iter()
            .find(|token| {
                let scene = &self.scenes[token.as_str()];
                scene.name == selector || Some(scene.scene_id) == numeric
            })
            .cloned()
    }

    /// Samples of a scene, keyed by sample token.
    pub fn scene_samples(&self, scene_token: &str) -> HashMap<Token, Sample> {
        self.scene_to_samples
            .get(scene_token)
            .into_iter()
            .flatten()
            .filter_map(|token| self.samples.get(token))
            .map(|sample| (sample.token.clone(), sample.clone()))
            .collect()
    }

    /// Every sample data record of a scene, ordered by timestamp.
    pub fn scene_sample_data(&self, scene_token: &str) -> Vec<SampleData> {
        let mut data: Vec<SampleData> = self
            .scene_to_samples
            .get(scene_token)
            .into_iter()
            .flatten()
            .filter_map(|token| self.sample_to_data.get(token))
            .flatten()
            .cloned()
            .collect();
        data.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.token.cmp(&b.token))
        });
        data
    }

    /// Annotations of a scene grouped by sample token, with category names resolved.
    pub fn scene_annotations(&self, scene_token: &str) -> HashMap<Token, Vec<Annotation>> {
        let mut result = HashMap::new();
        for sample_token in self.scene_to_samples.get(scene_token).into_iter().flatten() {
            let Some(records) = self.sample_to_annotations.get(sample_token) else {
                continue;
            };
            let annotations = records
                .iter()
                .map(|record| Annotation {
                    token: record.token.clone(),
                    sample_token: record.sample_token.clone(),
                    instance_token: record.instance_token.clone(),
                    translation: record.translation,
                    size: record.size,
                    rotation: record.rotation,
                    category_name: self.category_of(&record.instance_token),
                })
                .collect();
            result.insert(sample_token.clone(), annotations);
        }
        result
    }

    fn category_of(&self, instance_token: &str) -> String {
        self.instance_categories
            .get(instance_token)
            .and_then(|category| self.category_names.get(category))
            .cloned()
            .unwrap_or_default()
    }

    /// Ego poses referenced by a scene's sample data, deduplicated and ordered by timestamp.
    pub fn ego_poses(&self, scene_token: &str) -> Vec<EgoPose> {
        let mut seen = HashSet::new();
        let mut poses = Vec::new();
        for data in self.scene_sample_data(scene_token) {
            if !seen.insert(data.ego_pose_token.clone()) {
                continue;
            }
            match self.ego_poses.get(&data.ego_pose_token) {
                Some(pose) => poses.push(pose.clone()),
                None => warn!(
                    ego_pose = %data.ego_pose_token,
                    sample_data = %data.token,
                    "Ego pose referenced by sample data is missing"
                ),
            }
        }
        poses.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.token.cmp(&b.token))
        });
        poses
    }

    /// Look up a calibrated sensor by token.
    pub fn calibrated_sensor(&self, calibrated_sensor_token: &str) -> Option<CalibratedSensor> {
        self.calibrated_sensors.get(calibrated_sensor_token).cloned()
    }

    /// Look up a sensor by token.
    pub fn sensor(&self, sensor_token: &str) -> Option<Sensor> {
        self.sensors.get(sensor_token).cloned()
    }

    /// Lower-cased channel name of the sensor behind a calibrated sensor.
    pub fn sensor_name(&self, calibrated_sensor_token: &str) -> Option<String> {
        let calib = self.calibrated_sensors.get(calibrated_sensor_token)?;
        self.sensors
            .get(&calib.sensor_token)
            .map(Sensor::frame_name)
    }

    /// Calibrated sensors used by a scene paired with their sensor, ordered by channel.
    pub fn scene_calibrated_sensors(&self, scene_token: &str) -> Vec<(CalibratedSensor, Sensor)> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for data in self.scene_sample_data(scene_token) {
            if !seen.insert(data.calibrated_sensor_token.clone()) {
                continue;
            }
            let Some(calib) = self.calibrated_sensors.get(&data.calibrated_sensor_token) else {
                warn!(
                    calibrated_sensor = %data.calibrated_sensor_token,
                    "Calibrated sensor referenced by sample data is missing"
                );
                continue;
            };
            let Some(sensor) = self.sensors.get(&calib.sensor_token) else {
                warn!(sensor = %calib.sensor_token, "Sensor referenced by calibration is missing");
                continue;
            };
            result.push((calib.clone(), sensor.clone()));
        }
        result.sort_by(|(ca, sa), (cb, sb)| {
            sa.channel
                .cmp(&sb.channel)
                .then_with(|| ca.token.cmp(&cb.token))
        });
        result
    }
}

fn table_path(dir: &Path, name: &str) -> std::path::PathBuf {
    dir.join(format!("{name}.json"))
}

fn read_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = table_path(dir, name);
    let file = File::open(&path).map_err(|e| ConvertError::io(&path, e.to_string()))?;
    // SAFETY: the mapping is dropped before this function returns and the
    // tables are not modified while the converter runs.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ConvertError::io(&path, e.to_string()))?;
    serde_json::from_slice(&mmap)
        .map_err(|e| ConvertError::parse(format!("{name}.json"), e.to_string()))
}

fn read_optional_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    if !table_path(dir, name).exists() {
        debug!(table = name, "Optional metadata table absent");
        return Ok(Vec::new());
    }
    read_table(dir, name)
}
