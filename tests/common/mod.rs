// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! [`mini_dataset`] builds a two-scene nuScenes tree in a temporary directory:
//!
//! - `scene-0001`: keyframes `s1` (t=1.0s) and `s2` (t=1.5s), a camera, a lidar
//!   and a radar file on each keyframe, plus one lidar sweep at t=1.25s that
//!   belongs to `s2`. `s1` annotates a car and a pedestrian, `s2` the same car
//!   moved 10 m along x and a new bicycle.
//! - `scene-0002`: keyframe `s3` (t=2.0s) with a single camera frame.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

pub const META_DIR: &str = "v1.0-mini";

pub const SCENE_A: &str = "scene-a";
pub const SCENE_B: &str = "scene-b";

/// Messages per topic expected in the log of `scene-0001`.
pub fn scene_a_topic_counts() -> BTreeMap<String, u64> {
    [
        ("/odom", 7),
        ("/tf", 7),
        ("boxes", 7),
        ("boxes_viz", 7),
        ("cam_front/camera_info", 2),
        ("cam_front/raw", 2),
        ("lidar_top", 3),
        ("radar_front", 2),
    ]
    .into_iter()
    .map(|(topic, count)| (topic.to_string(), count))
    .collect()
}

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn meta(&self) -> PathBuf {
        self.root().join(META_DIR)
    }

    pub fn out(&self) -> PathBuf {
        self.root().join("out")
    }

    /// Overwrite one metadata table.
    pub fn write_table(&self, name: &str, rows: Value) {
        write_json(&self.meta().join(format!("{name}.json")), &rows);
    }
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn write_file(root: &Path, relative: &str, bytes: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Little-endian `x y z intensity ring` records.
pub fn lidar_bytes(points: &[[f32; 5]]) -> Vec<u8> {
    points
        .iter()
        .flatten()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// ASCII radar PCD with the given `x y z rcs` rows.
pub fn radar_pcd(rows: &[[f32; 4]]) -> Vec<u8> {
    let mut text = format!(
        "# .PCD v0.7 - Point Cloud Data file format\nVERSION 0.7\nFIELDS x y z rcs\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 1\nWIDTH {n}\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS {n}\nDATA ascii\n",
        n = rows.len()
    );
    for row in rows {
        text.push_str(&format!("{} {} {} {}\n", row[0], row[1], row[2], row[3]));
    }
    text.into_bytes()
}

fn file_name(dir: &str, channel: &str, stamp: u64, ext: &str) -> String {
    format!("{dir}/{channel}/n000-2018-01-01-00-00-00+0000__{channel}__{stamp}.{ext}")
}

struct DataRow {
    token: &'static str,
    sample: &'static str,
    calib: &'static str,
    channel: &'static str,
    stamp: u64,
    key: bool,
}

const DATA_ROWS: [DataRow; 8] = [
    DataRow { token: "sd-cam-1", sample: "s1", calib: "cs-cam", channel: "CAM_FRONT", stamp: 1_000_000, key: true },
    DataRow { token: "sd-lidar-1", sample: "s1", calib: "cs-lidar", channel: "LIDAR_TOP", stamp: 1_000_000, key: true },
    DataRow { token: "sd-radar-1", sample: "s1", calib: "cs-radar", channel: "RADAR_FRONT", stamp: 1_000_000, key: true },
    DataRow { token: "sd-lidar-sweep", sample: "s2", calib: "cs-lidar", channel: "LIDAR_TOP", stamp: 1_250_000, key: false },
    DataRow { token: "sd-cam-2", sample: "s2", calib: "cs-cam", channel: "CAM_FRONT", stamp: 1_500_000, key: true },
    DataRow { token: "sd-lidar-2", sample: "s2", calib: "cs-lidar", channel: "LIDAR_TOP", stamp: 1_500_000, key: true },
    DataRow { token: "sd-radar-2", sample: "s2", calib: "cs-radar", channel: "RADAR_FRONT", stamp: 1_500_000, key: true },
    DataRow { token: "sd-cam-3", sample: "s3", calib: "cs-cam", channel: "CAM_FRONT", stamp: 2_000_000, key: true },
];

/// Relative file name of a sample data row of the fixture.
pub fn data_file(token: &str) -> String {
    let row = DATA_ROWS.iter().find(|r| r.token == token).unwrap();
    data_row_file(row)
}

fn data_row_file(row: &DataRow) -> String {
    let dir = if row.key { "samples" } else { "sweeps" };
    let ext = match row.channel {
        "CAM_FRONT" => "jpg",
        "LIDAR_TOP" => "pcd.bin",
        _ => "pcd",
    };
    file_name(dir, row.channel, row.stamp, ext)
}

/// Build the two-scene fixture.
pub fn mini_dataset() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let fixture = Fixture { dir };
    fs::create_dir_all(fixture.meta()).unwrap();

    fixture.write_table(
        "scene",
        json!([
            {"token": SCENE_A, "name": "scene-0001", "description": "two keyframes",
             "first_sample_token": "s1", "last_sample_token": "s2", "nbr_samples": 2},
            {"token": SCENE_B, "name": "scene-0002", "description": "one keyframe",
             "first_sample_token": "s3", "last_sample_token": "s3", "nbr_samples": 1},
        ]),
    );
    fixture.write_table(
        "sample",
        json!([
            {"token": "s1", "timestamp": 1_000_000, "prev": "", "next": "s2", "scene_token": SCENE_A},
            {"token": "s2", "timestamp": 1_500_000, "prev": "s1", "next": "", "scene_token": SCENE_A},
            {"token": "s3", "timestamp": 2_000_000, "prev": "", "next": "", "scene_token": SCENE_B},
        ]),
    );

    let mut sample_data = Vec::new();
    let mut ego_poses = Vec::new();
    for (i, row) in DATA_ROWS.iter().enumerate() {
        let filename = data_row_file(row);
        let (width, height) = if row.channel == "CAM_FRONT" { (1600, 900) } else { (0, 0) };
        sample_data.push(json!({
            "token": row.token,
            "sample_token": row.sample,
            "ego_pose_token": format!("ep-{}", row.token),
            "calibrated_sensor_token": row.calib,
            "timestamp": row.stamp,
            "fileformat": filename.rsplit('.').next().unwrap(),
            "is_key_frame": row.key,
            "height": height,
            "width": width,
            "filename": filename,
            "prev": "",
            "next": "",
        }));
        ego_poses.push(json!({
            "token": format!("ep-{}", row.token),
            "timestamp": row.stamp,
            "rotation": [1.0, 0.0, 0.0, 0.0],
            "translation": [i as f64, 0.0, 0.0],
        }));

        let bytes = match row.channel {
            "CAM_FRONT" => vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0xff, 0xd9],
            "LIDAR_TOP" => lidar_bytes(&[[1.0, 2.0, 3.0, 10.0, 0.0], [4.0, 5.0, 6.0, 20.0, 1.0]]),
            _ => radar_pcd(&[[12.0, -1.5, 0.0, 7.5]]),
        };
        write_file(fixture.root(), &filename, &bytes);
    }
    fixture.write_table("sample_data", Value::Array(sample_data));
    fixture.write_table("ego_pose", Value::Array(ego_poses));

    fixture.write_table(
        "sensor",
        json!([
            {"token": "sensor-cam", "channel": "CAM_FRONT", "modality": "camera"},
            {"token": "sensor-lidar", "channel": "LIDAR_TOP", "modality": "lidar"},
            {"token": "sensor-radar", "channel": "RADAR_FRONT", "modality": "radar"},
        ]),
    );
    fixture.write_table(
        "calibrated_sensor",
        json!([
            {"token": "cs-cam", "sensor_token": "sensor-cam",
             "translation": [1.7, 0.0, 1.5], "rotation": [0.5, -0.5, 0.5, -0.5],
             "camera_intrinsic": [[1266.4, 0.0, 816.3], [0.0, 1266.4, 491.5], [0.0, 0.0, 1.0]]},
            {"token": "cs-lidar", "sensor_token": "sensor-lidar",
             "translation": [0.9, 0.0, 1.8], "rotation": [0.7071, 0.0, 0.0, -0.7071],
             "camera_intrinsic": []},
            {"token": "cs-radar", "sensor_token": "sensor-radar",
             "translation": [3.4, 0.0, 0.5], "rotation": [1.0, 0.0, 0.0, 0.0],
             "camera_intrinsic": []},
        ]),
    );

    fixture.write_table(
        "sample_annotation",
        json!([
            {"token": "ann-car-1", "sample_token": "s1", "instance_token": "inst-car",
             "translation": [0.0, 0.0, 0.0], "size": [2.0, 4.5, 1.6], "rotation": [1.0, 0.0, 0.0, 0.0]},
            {"token": "ann-ped-1", "sample_token": "s1", "instance_token": "inst-ped",
             "translation": [5.0, 5.0, 0.0], "size": [0.6, 0.6, 1.8], "rotation": [1.0, 0.0, 0.0, 0.0]},
            {"token": "ann-car-2", "sample_token": "s2", "instance_token": "inst-car",
             "translation": [10.0, 0.0, 0.0], "size": [2.0, 4.5, 1.6],
             "rotation": [0.7071067811865476, 0.0, 0.0, 0.7071067811865476]},
            {"token": "ann-bike-2", "sample_token": "s2", "instance_token": "inst-bike",
             "translation": [-3.0, 2.0, 0.0], "size": [0.7, 1.8, 1.2], "rotation": [1.0, 0.0, 0.0, 0.0]},
        ]),
    );
    fixture.write_table(
        "instance",
        json!([
            {"token": "inst-car", "category_token": "cat-car"},
            {"token": "inst-ped", "category_token": "cat-ped"},
            {"token": "inst-bike", "category_token": "cat-bike"},
        ]),
    );
    fixture.write_table(
        "category",
        json!([
            {"token": "cat-car", "name": "vehicle.car"},
            {"token": "cat-ped", "name": "human.pedestrian.adult"},
            {"token": "cat-bike", "name": "vehicle.bicycle"},
        ]),
    );

    fixture
}

/// One message read back from an output log.
#[derive(Debug, Clone)]
pub struct LoggedMessage {
    pub topic: String,
    pub schema_name: String,
    pub schema_encoding: String,
    pub message_encoding: String,
    pub log_time: u64,
    pub publish_time: u64,
    pub data: Vec<u8>,
}

/// Read every message of an MCAP file with the `mcap` crate.
pub fn read_log(path: &Path) -> Vec<LoggedMessage> {
    let bytes = fs::read(path).unwrap();
    mcap::MessageStream::new(&bytes)
        .unwrap()
        .map(|message| {
            let message = message.unwrap();
            let schema = message.channel.schema.as_ref().unwrap();
            LoggedMessage {
                topic: message.channel.topic.clone(),
                schema_name: schema.name.clone(),
                schema_encoding: schema.encoding.clone(),
                message_encoding: message.channel.message_encoding.clone(),
                log_time: message.log_time,
                publish_time: message.publish_time,
                data: message.data.into_owned(),
            }
        })
        .collect()
}

/// Messages per topic of an MCAP file.
pub fn topic_counts(path: &Path) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for message in read_log(path) {
        *counts.entry(message.topic).or_insert(0) += 1;
    }
    counts
}
